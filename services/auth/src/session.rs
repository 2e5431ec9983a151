//! Session management over the persisted token slot

use std::sync::{Arc, RwLock};

use common::{http::PortfolioApi, token_store::TokenStore};
use tracing::{info, warn};

/// Snapshot of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    /// True only while a verified token is held
    pub is_authenticated: bool,
    /// True until the start-up check has finished
    pub loading: bool,
}

/// Result of a login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub success: bool,
    /// Human readable reason, set on failure
    pub message: Option<String>,
}

impl LoginOutcome {
    fn succeeded() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            message: Some(message),
        }
    }
}

/// Session manager tying the token slot to the HTTP client's credential
pub struct SessionManager {
    api: Arc<dyn PortfolioApi>,
    store: Arc<dyn TokenStore>,
    state: RwLock<SessionState>,
}

impl SessionManager {
    /// Create a new session manager. Nothing is verified until `restore`
    pub fn new(api: Arc<dyn PortfolioApi>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            store,
            state: RwLock::new(SessionState {
                is_authenticated: false,
                loading: true,
            }),
        }
    }

    /// Client carrying this session's credential
    pub fn api(&self) -> Arc<dyn PortfolioApi> {
        Arc::clone(&self.api)
    }

    pub fn state(&self) -> SessionState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    fn set_state(&self, is_authenticated: bool) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.is_authenticated = is_authenticated;
        state.loading = false;
    }

    /// Start-up check: verify the persisted token, if there is one
    pub async fn restore(&self) -> bool {
        match self.store.load() {
            Ok(Some(token)) => self.verify(&token).await,
            Ok(None) => {
                info!("No persisted session token");
                self.set_state(false);
                false
            }
            Err(e) => {
                warn!("Failed to read persisted session token: {}", e);
                self.set_state(false);
                false
            }
        }
    }

    /// Ask the backend to confirm `token`
    ///
    /// Any failure, rejection or transport, discards the token. There is
    /// no retry.
    pub async fn verify(&self, token: &str) -> bool {
        self.api.set_token(Some(token.to_string()));

        match self.api.verify().await {
            Ok(()) => {
                info!("Session token verified");
                self.set_state(true);
                true
            }
            Err(e) => {
                warn!("Session token verification failed: {}", e);
                self.discard_token();
                self.set_state(false);
                false
            }
        }
    }

    /// Exchange `password` for a session token
    ///
    /// On failure the previous session, persisted token included, is left
    /// as it was.
    pub async fn login(&self, password: &str) -> LoginOutcome {
        let token = match self.api.login(password).await {
            Ok(token) => token,
            Err(e) => {
                warn!("Login failed: {}", e);
                return LoginOutcome::failed(e.user_message("Login failed"));
            }
        };

        if let Err(e) = self.store.save(&token) {
            warn!("Failed to persist session token: {}", e);
        }
        self.api.set_token(Some(token));
        self.set_state(true);

        info!("Logged in");
        LoginOutcome::succeeded()
    }

    /// Drop the session. Safe to call when already logged out
    pub fn logout(&self) {
        self.discard_token();
        self.set_state(false);
        info!("Logged out");
    }

    fn discard_token(&self) {
        if let Err(e) = self.store.clear() {
            warn!("Failed to remove persisted session token: {}", e);
        }
        self.api.set_token(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{
        testing::FakeApi,
        token_store::{MemoryTokenStore, TokenStore},
    };

    const PASSWORD: &str = "correct horse";

    fn manager(store: MemoryTokenStore) -> (SessionManager, Arc<FakeApi>, Arc<MemoryTokenStore>) {
        let api = Arc::new(FakeApi::new(PASSWORD));
        let store = Arc::new(store);
        let session = SessionManager::new(api.clone(), store.clone());
        (session, api, store)
    }

    #[tokio::test]
    async fn test_starts_loading_and_unauthenticated() {
        let (session, _, _) = manager(MemoryTokenStore::new());
        assert_eq!(
            session.state(),
            SessionState {
                is_authenticated: false,
                loading: true
            }
        );

        assert!(!session.restore().await);
        assert!(!session.is_loading());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_then_verify() {
        let (session, api, store) = manager(MemoryTokenStore::new());

        let outcome = session.login(PASSWORD).await;
        assert!(outcome.success);
        assert!(session.is_authenticated());

        let token = store.load().unwrap().expect("token should be persisted");
        assert_eq!(token, FakeApi::issued_token());
        assert_eq!(api.token().as_deref(), Some(FakeApi::issued_token()));

        assert!(session.verify(&token).await);
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_previous_session() {
        let (session, api, store) = manager(MemoryTokenStore::new());
        assert!(session.login(PASSWORD).await.success);

        let outcome = session.login("wrong").await;
        assert!(!outcome.success);
        assert_eq!(outcome.message.as_deref(), Some("Invalid password"));

        assert!(session.is_authenticated());
        assert_eq!(
            store.load().unwrap().as_deref(),
            Some(FakeApi::issued_token())
        );
        assert_eq!(api.token().as_deref(), Some(FakeApi::issued_token()));
    }

    #[tokio::test]
    async fn test_login_failure_without_backend_message() {
        let (session, api, _) = manager(MemoryTokenStore::new());
        api.set_offline(true);

        let outcome = session.login(PASSWORD).await;
        assert_eq!(outcome.message.as_deref(), Some("Login failed"));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_with_valid_token() {
        let (session, api, _) = manager(MemoryTokenStore::with_token(FakeApi::issued_token()));

        assert!(session.restore().await);
        assert!(session.is_authenticated());
        assert!(!session.is_loading());
        assert!(api.calls().contains(&"POST /api/auth/verify".to_string()));
    }

    #[tokio::test]
    async fn test_failed_verify_discards_token() {
        let (session, api, store) = manager(MemoryTokenStore::with_token("expired"));

        assert!(!session.restore().await);
        assert!(!session.is_authenticated());
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(api.token(), None);
    }

    #[tokio::test]
    async fn test_unreachable_backend_discards_token() {
        let (session, api, store) = manager(MemoryTokenStore::with_token(FakeApi::issued_token()));
        api.set_offline(true);

        assert!(!session.restore().await);
        assert!(!session.is_authenticated());
        assert_eq!(store.load().unwrap(), None);

        // Exactly one attempt, no retry
        let verifies = api
            .calls()
            .iter()
            .filter(|c| c.as_str() == "POST /api/auth/verify")
            .count();
        assert_eq!(verifies, 1);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let (session, api, store) = manager(MemoryTokenStore::new());
        assert!(session.login(PASSWORD).await.success);

        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(api.token(), None);

        session.logout();
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_requests_after_login_carry_token() {
        let (session, api, _) = manager(MemoryTokenStore::new());

        assert!(api.admin_collections().await.is_err());
        assert!(session.login(PASSWORD).await.success);
        tokio_test::assert_ok!(api.admin_collections().await);

        session.logout();
        assert!(api.admin_collections().await.is_err());
    }
}
