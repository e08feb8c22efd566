use serde::{Deserialize, Serialize};

/// One side of a simulation exchange, stored per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub role: String,
    pub text: String,
    pub ts: i64,
}

impl Message {
    pub fn new(session_id: &str, role: &str, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            role: role.to_string(),
            text: text.into(),
            ts: chrono::Utc::now().timestamp(),
        }
    }
}
