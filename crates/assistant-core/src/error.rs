//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider did not answer within its request timeout
    #[error("Provider timed out after {0}s")]
    ProviderTimeout(u64),

    /// Tool not found in the catalog
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// A tool with the same name is already registered
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    /// Tool validation failed
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_detail() {
        assert_eq!(
            AgentError::ToolNotFound("Calendar".into()).to_string(),
            "Tool not found: Calendar"
        );
        assert_eq!(
            AgentError::ProviderTimeout(30).to_string(),
            "Provider timed out after 30s"
        );
    }
}
