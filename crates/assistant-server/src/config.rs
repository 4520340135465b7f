//! Server configuration from environment variables

use std::path::PathBuf;

use assistant_core::{AgentError, Result};

/// Which LLM backend drives the agent
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LlmSettings {
    OpenAi { api_key: String, base_url: String },
    Ollama { host: String, port: u16 },
}

impl LlmSettings {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::OpenAi { .. } => "openai",
            Self::Ollama { .. } => "ollama",
        }
    }
}

/// Typed application configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm: LlmSettings,
    pub model: String,
    /// Retrieval service location; `POSTGRES_CONNECTION_STRING` unless
    /// `RETRIEVAL_URL` overrides it
    pub retrieval_url: String,
    pub rag_collection: String,
    pub openweather_api_key: String,
    pub serpapi_api_key: String,
    pub data_dir: PathBuf,
    pub max_iterations: usize,
    pub bind_addr: String,
}

impl AppConfig {
    /// Read from the process environment
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through `lookup`; blank values count as unset
    ///
    /// # Errors
    ///
    /// Returns `AgentError::Config` naming the first missing or unparseable
    /// variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| AgentError::Config(format!("{key} is not set")))
        };

        let llm = match get("LLM_PROVIDER").as_deref().unwrap_or("openai") {
            "openai" => LlmSettings::OpenAi {
                api_key: require("OPENAI_API_KEY")?,
                base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| "https://api.openai.com/v1".into()),
            },
            "ollama" => LlmSettings::Ollama {
                host: get("OLLAMA_HOST").unwrap_or_else(|| "http://localhost".into()),
                port: parse(get("OLLAMA_PORT"), "OLLAMA_PORT", 11434)?,
            },
            other => {
                return Err(AgentError::Config(format!(
                    "LLM_PROVIDER must be 'openai' or 'ollama', got '{other}'"
                )));
            }
        };

        let default_model = match llm {
            LlmSettings::OpenAi { .. } => "gpt-3.5-turbo",
            LlmSettings::Ollama { .. } => "llama3.2",
        };

        let postgres_connection_string = require("POSTGRES_CONNECTION_STRING")?;

        Ok(Self {
            model: get("LLM_MODEL").unwrap_or_else(|| default_model.into()),
            retrieval_url: get("RETRIEVAL_URL").unwrap_or(postgres_connection_string),
            rag_collection: get("RAG_COLLECTION").unwrap_or_else(|| "rag_docs".into()),
            openweather_api_key: require("OPENWEATHER_API_KEY")?,
            serpapi_api_key: require("SERPAPI_API_KEY")?,
            data_dir: get("ASSISTANT_DATA_DIR").map_or_else(|| PathBuf::from("."), PathBuf::from),
            max_iterations: parse(get("AGENT_MAX_ITERATIONS"), "AGENT_MAX_ITERATIONS", 5)?,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            llm,
        })
    }
}

fn parse<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
    value.map_or(Ok(default), |v| {
        v.parse()
            .map_err(|_| AgentError::Config(format!("{key} has an invalid value: '{v}'")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("OPENAI_API_KEY", "sk-test"),
        ("POSTGRES_CONNECTION_STRING", "http://localhost:8000"),
        ("OPENWEATHER_API_KEY", "ow-key"),
        ("SERPAPI_API_KEY", "serp-key"),
    ];

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(
            config.llm,
            LlmSettings::OpenAi {
                api_key: "sk-test".into(),
                base_url: "https://api.openai.com/v1".into(),
            }
        );
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.retrieval_url, "http://localhost:8000");
        assert_eq!(config.rag_collection, "rag_docs");
        assert_eq!(config.data_dir, PathBuf::from("."));
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_each_required_variable_is_enforced() {
        for (missing, _) in REQUIRED {
            let pairs: Vec<(&str, &str)> = REQUIRED.iter().copied().filter(|(k, _)| *k != missing).collect();
            let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(
                matches!(&err, AgentError::Config(msg) if msg.contains(missing)),
                "{missing}: {err}"
            );
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let pairs: Vec<(&str, &str)> = REQUIRED
            .iter()
            .map(|&(k, v)| if k == "SERPAPI_API_KEY" { (k, "   ") } else { (k, v) })
            .collect();
        assert!(AppConfig::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_ollama_needs_no_openai_key() {
        let mut pairs: Vec<(&str, &str)> =
            REQUIRED.iter().copied().filter(|(k, _)| *k != "OPENAI_API_KEY").collect();
        pairs.extend([("LLM_PROVIDER", "ollama"), ("OLLAMA_PORT", "11500")]);

        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(
            config.llm,
            LlmSettings::Ollama {
                host: "http://localhost".into(),
                port: 11500,
            }
        );
        assert_eq!(config.model, "llama3.2");
    }

    #[test]
    fn test_invalid_values() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("AGENT_MAX_ITERATIONS", "many"));
        assert!(AppConfig::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("LLM_PROVIDER", "anthropic"));
        assert!(AppConfig::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_retrieval_url_override() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("RETRIEVAL_URL", "http://retriever:9000"));

        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.retrieval_url, "http://retriever:9000");
    }
}
