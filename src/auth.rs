// ABOUTME: Session token source attaching bearer credentials to clinic API requests
// ABOUTME: Expired tokens are withheld and the session is cleared when the API answers 401
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

//! # Session credentials
//!
//! Login happens against an external identity provider through a redirect
//! flow that is outside this crate. What reaches us is an access token and
//! its expiry; [`SessionToken`] keeps them and hands the token to the API
//! client while it is valid.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Source of bearer tokens for API requests
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Current access token, `None` when signed out or expired
    async fn access_token(&self) -> Option<String>;

    /// Forget the session after the API rejected it
    async fn clear(&self);
}

#[derive(Debug, Clone)]
struct Credentials {
    access_token: String,
    expires_at: Option<DateTime<Utc>>,
}

/// In-memory session holding the identity provider's access token
#[derive(Debug, Default)]
pub struct SessionToken {
    credentials: RwLock<Option<Credentials>>,
}

impl SessionToken {
    /// Session without credentials
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session with a token that never expires locally
    #[must_use]
    pub fn with_token(access_token: impl Into<String>) -> Self {
        Self {
            credentials: RwLock::new(Some(Credentials {
                access_token: access_token.into(),
                expires_at: None,
            })),
        }
    }

    /// Replace the session credentials
    pub async fn sign_in(&self, access_token: impl Into<String>, expires_at: Option<DateTime<Utc>>) {
        *self.credentials.write().await = Some(Credentials {
            access_token: access_token.into(),
            expires_at,
        });
        info!("session credentials updated");
    }

    /// Whether a non-expired token is held
    pub async fn is_authenticated(&self) -> bool {
        self.access_token().await.is_some()
    }
}

#[async_trait]
impl TokenSource for SessionToken {
    async fn access_token(&self) -> Option<String> {
        let guard = self.credentials.read().await;
        let credentials = guard.as_ref()?;
        match credentials.expires_at {
            Some(expiry) if expiry <= Utc::now() => None,
            _ => Some(credentials.access_token.clone()),
        }
    }

    async fn clear(&self) {
        if self.credentials.write().await.take().is_some() {
            warn!("session rejected by the API, credentials cleared");
        }
    }
}
