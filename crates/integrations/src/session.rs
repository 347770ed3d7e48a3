use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::domain::SessionId;
use tokio::sync::RwLock;

use crate::{LoginSession, SessionStore};

#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, LoginSession>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn login(&self, session_id: SessionId) -> anyhow::Result<Option<LoginSession>> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn create(&self, email: &str, now: DateTime<Utc>) -> anyhow::Result<LoginSession> {
        let email = email.trim();
        if email.is_empty() {
            anyhow::bail!("email is required to log in");
        }

        let session = LoginSession {
            session_id: SessionId::new(),
            email: email.to_string(),
            created_at: now,
        };
        self.sessions
            .write()
            .await
            .insert(session.session_id, session.clone());
        Ok(session)
    }
}
