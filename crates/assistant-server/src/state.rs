//! Application State

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use assistant_core::{Agent, Session, SessionId};
use assistant_tools::{Reminder, SharedStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Agent with the full tool catalog
    pub agent: Arc<Agent>,

    /// Chat sessions; the lock is held for a whole turn
    pub sessions: Arc<Mutex<HashMap<SessionId, Session>>>,

    /// Reminder list (shared with the Reminder tool)
    pub reminders: SharedStore<Reminder>,

    /// To-do list (shared with the ToDo tool)
    pub todos: SharedStore<String>,
}

impl AppState {
    pub fn new(agent: Arc<Agent>, reminders: SharedStore<Reminder>, todos: SharedStore<String>) -> Self {
        Self {
            agent,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            reminders,
            todos,
        }
    }
}
