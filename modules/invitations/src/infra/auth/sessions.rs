use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use moka::future::Cache;
use ring::rand::{SecureRandom, SystemRandom};

use crate::contract::model::AccountId;

pub const SESSION_COOKIE: &str = "session_id";

const TOKEN_BYTES: usize = 32;
const MAX_SESSIONS: u64 = 10_000;

/// In-memory login sessions: opaque cookie token → account id.
/// Sessions are lost on restart and expire after `ttl` of inactivity.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, AccountId>,
    rng: SystemRandom,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_idle(ttl)
            .build();
        Self {
            sessions,
            rng: SystemRandom::new(),
        }
    }

    pub async fn create(&self, account_id: AccountId) -> anyhow::Result<String> {
        let mut bytes = [0u8; TOKEN_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| anyhow::anyhow!("system random generator unavailable"))?;
        let token = URL_SAFE_NO_PAD.encode(bytes);
        self.sessions.insert(token.clone(), account_id).await;
        tracing::debug!(account_id, "session created");
        Ok(token)
    }

    pub async fn resolve(&self, token: &str) -> Option<AccountId> {
        self.sessions.get(token).await
    }

    pub async fn revoke(&self, token: &str) {
        self.sessions.invalidate(token).await;
    }
}
