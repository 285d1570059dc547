//! Session and auth-state access.

use crate::gateway::GatewayError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The signed-in user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Read the current session and follow sign-in / sign-out transitions.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_session(&self) -> Result<Option<Session>, GatewayError>;

    /// Receiver updated on every auth-state transition. Dropping it unsubscribes.
    fn watch_auth(&self) -> watch::Receiver<Option<Session>>;
}
