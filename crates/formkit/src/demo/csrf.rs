//! CSRF token generation and verification.

use anyhow::{Context, Result, bail};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tower_sessions::Session;

/// Session key for storing CSRF tokens.
const CSRF_SESSION_KEY: &str = "csrf_tokens";

/// Maximum number of tokens to store per session.
const MAX_TOKENS: usize = 10;

/// Token validity period in seconds (1 hour).
const TOKEN_VALIDITY_SECS: i64 = 3600;

/// A token as kept in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IssuedToken {
    token: String,
    issued_at: i64,
}

impl IssuedToken {
    fn is_fresh(&self, now: i64) -> bool {
        now - self.issued_at <= TOKEN_VALIDITY_SECS
    }
}

async fn load_tokens(session: &Session) -> Vec<IssuedToken> {
    session
        .get(CSRF_SESSION_KEY)
        .await
        .unwrap_or(None)
        .unwrap_or_default()
}

/// Generate a CSRF token and store it in the session.
pub async fn generate_csrf_token(session: &Session) -> Result<String> {
    let mut random_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut random_bytes);

    let issued_at = chrono::Utc::now().timestamp();

    let mut hasher = Sha256::new();
    hasher.update(random_bytes);
    hasher.update(issued_at.to_le_bytes());
    let token = hex::encode(hasher.finalize());

    let mut tokens = load_tokens(session).await;
    tokens.push(IssuedToken {
        token: token.clone(),
        issued_at,
    });

    // Keep only the most recent tokens
    if tokens.len() > MAX_TOKENS {
        let skip = tokens.len() - MAX_TOKENS;
        tokens.drain(..skip);
    }

    session
        .insert(CSRF_SESSION_KEY, tokens)
        .await
        .context("failed to store CSRF token")?;

    Ok(token)
}

/// Verify a CSRF token against the session.
///
/// Tokens are single-use and time-limited.
pub async fn verify_csrf_token(session: &Session, submitted: &str) -> Result<bool> {
    if submitted.is_empty() {
        bail!("empty CSRF token");
    }

    let mut tokens = load_tokens(session).await;
    if tokens.is_empty() {
        return Ok(false);
    }

    let now = chrono::Utc::now().timestamp();
    let found = tokens.iter().position(|issued| {
        bool::from(issued.token.as_bytes().ct_eq(submitted.as_bytes())) && issued.is_fresh(now)
    });

    let Some(index) = found else {
        return Ok(false);
    };

    tokens.remove(index);
    tokens.retain(|issued| issued.is_fresh(now));

    session
        .insert(CSRF_SESSION_KEY, tokens)
        .await
        .context("failed to update CSRF tokens")?;

    Ok(true)
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_token_is_hex_sha256() {
        let token = generate_csrf_token(&session()).await.unwrap();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_token_is_single_use() {
        let session = session();
        let token = generate_csrf_token(&session).await.unwrap();

        assert!(verify_csrf_token(&session, &token).await.unwrap());
        assert!(!verify_csrf_token(&session, &token).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_and_empty_tokens() {
        let session = session();
        assert!(!verify_csrf_token(&session, "abc").await.unwrap());

        generate_csrf_token(&session).await.unwrap();
        assert!(!verify_csrf_token(&session, "abc").await.unwrap());
        assert!(verify_csrf_token(&session, "").await.is_err());
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let session = session();
        let stale = IssuedToken {
            token: "a".repeat(64),
            issued_at: chrono::Utc::now().timestamp() - TOKEN_VALIDITY_SECS - 1,
        };
        session.insert(CSRF_SESSION_KEY, vec![stale]).await.unwrap();

        assert!(!verify_csrf_token(&session, &"a".repeat(64)).await.unwrap());
    }

    #[tokio::test]
    async fn test_only_recent_tokens_kept() {
        let session = session();
        let first = generate_csrf_token(&session).await.unwrap();
        for _ in 0..MAX_TOKENS {
            generate_csrf_token(&session).await.unwrap();
        }

        assert_eq!(load_tokens(&session).await.len(), MAX_TOKENS);
        assert!(!verify_csrf_token(&session, &first).await.unwrap());
    }
}
