//! Authentication client over the hosted auth provider.
//!
//! Wraps the GoTrue REST surface: password and OAuth sign-in, sign-up,
//! sign-out, and an explicit subscription handle for auth state
//! changes. Provider error messages are classified into the
//! human-readable variants the UI surfaces verbatim.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use reqwest::Client;
use serde::Deserialize;

use crate::config::CloudConfig;

/// Classified authentication failures. Display strings are shown to
/// the learner as-is.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Please check your email and confirm your account")]
    UnconfirmedAccount,

    #[error("Password must be at least 6 characters long")]
    WeakPassword,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("An account with this email already exists")]
    DuplicateAccount,

    #[error("Cloud backend not configured. Set SUPABASE_URL and SUPABASE_ANON_KEY first.")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Provider(String),
}

/// An authenticated learner session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub learner_id: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Auth state change notification kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
}

type AuthCallback = Arc<dyn Fn(AuthEvent, Option<&AuthSession>) + Send + Sync>;

/// Lock a mutex, recovering the data when a previous holder panicked.
/// Both guarded values stay valid across a panic (the session is a
/// plain swap, the subscriber list only grows and shrinks).
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct AuthClientInner {
    client: Client,
    config: Option<CloudConfig>,
    session: Mutex<Option<AuthSession>>,
    subscribers: Mutex<Vec<(u64, AuthCallback)>>,
    next_subscription_id: AtomicU64,
}

/// Auth client. Clone-able; all state lives behind an `Arc`.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

/// Handle for an auth state subscription. Dropping it (or calling
/// `unsubscribe`) deregisters the callback; tie it to the owning
/// view's teardown.
pub struct AuthSubscription {
    id: u64,
    inner: Weak<AuthClientInner>,
}

impl AuthSubscription {
    pub fn unsubscribe(self) {}
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            lock(&inner.subscribers).retain(|(id, _)| *id != self.id);
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user: AuthUser,
}

/// Sign-up responses carry a session only when email confirmation is
/// disabled on the project.
#[derive(Debug, Deserialize)]
struct SignupResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<AuthUser>,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ProviderErrorBody {
    fn text(self) -> String {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

/// Map a raw provider message onto the classified taxonomy.
fn classify(message: &str) -> AuthError {
    if message.contains("Invalid login credentials") {
        AuthError::InvalidCredentials
    } else if message.contains("Email not confirmed") {
        AuthError::UnconfirmedAccount
    } else if message.contains("already registered") {
        AuthError::DuplicateAccount
    } else if message.contains("Password") {
        AuthError::WeakPassword
    } else if message.contains("email") || message.contains("Email") {
        AuthError::InvalidEmail
    } else {
        AuthError::Provider(message.to_string())
    }
}

impl AuthClient {
    pub fn new(config: Option<CloudConfig>) -> Self {
        Self {
            inner: Arc::new(AuthClientInner {
                client: Client::new(),
                config,
                session: Mutex::new(None),
                subscribers: Mutex::new(Vec::new()),
                next_subscription_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.config.is_some()
    }

    /// The current session, if a learner is signed in.
    pub fn current_session(&self) -> Option<AuthSession> {
        lock(&self.inner.session).clone()
    }

    /// Subscribe to auth state changes. Unconfigured backends hand out
    /// an inert handle, mirroring demo mode elsewhere.
    pub fn on_auth_state_change(
        &self,
        callback: impl Fn(AuthEvent, Option<&AuthSession>) + Send + Sync + 'static,
    ) -> AuthSubscription {
        if self.inner.config.is_none() {
            return AuthSubscription {
                id: 0,
                inner: Weak::new(),
            };
        }
        let id = self.inner.next_subscription_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.subscribers).push((id, Arc::new(callback)));
        AuthSubscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn notify(&self, event: AuthEvent, session: Option<&AuthSession>) {
        // Snapshot the callbacks so none run under the lock.
        let callbacks: Vec<AuthCallback> = lock(&self.inner.subscribers)
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(event, session);
        }
    }

    /// Seed a session restored from storage (e.g. a persisted refresh
    /// token the UI shell kept across launches).
    pub fn restore_session(&self, session: AuthSession) {
        *lock(&self.inner.session) = Some(session.clone());
        self.notify(AuthEvent::SignedIn, Some(&session));
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let config = self.inner.config.as_ref().ok_or(AuthError::NotConfigured)?;

        let resp = self
            .inner
            .client
            .post(format!("{}/auth/v1/token?grant_type=password", config.url))
            .header("apikey", &config.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let body: ProviderErrorBody = resp.json().await.unwrap_or_default();
            return Err(classify(&body.text()));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        let session = AuthSession {
            learner_id: token.user.id,
            email: token.user.email.unwrap_or_default(),
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        };
        *lock(&self.inner.session) = Some(session.clone());
        self.notify(AuthEvent::SignedIn, Some(&session));
        Ok(session)
    }

    /// Create an account. Returns `None` when the project requires
    /// email confirmation before the first session.
    pub async fn sign_up_with_password(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Option<AuthSession>, AuthError> {
        let config = self.inner.config.as_ref().ok_or(AuthError::NotConfigured)?;

        let resp = self
            .inner
            .client
            .post(format!("{}/auth/v1/signup", config.url))
            .header("apikey", &config.anon_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "full_name": display_name },
            }))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let body: ProviderErrorBody = resp.json().await.unwrap_or_default();
            return Err(classify(&body.text()));
        }

        let signup: SignupResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        match (signup.access_token, signup.user) {
            (Some(access_token), Some(user)) => {
                let session = AuthSession {
                    learner_id: user.id,
                    email: user.email.unwrap_or_default(),
                    access_token,
                    refresh_token: signup.refresh_token,
                };
                *lock(&self.inner.session) = Some(session.clone());
                self.notify(AuthEvent::SignedIn, Some(&session));
                Ok(Some(session))
            }
            _ => Ok(None),
        }
    }

    /// Build the OAuth authorization URL the UI should navigate to.
    pub fn sign_in_with_oauth(&self, provider: &str) -> Result<String, AuthError> {
        let config = self.inner.config.as_ref().ok_or(AuthError::NotConfigured)?;
        Ok(format!(
            "{}/auth/v1/authorize?provider={provider}",
            config.url
        ))
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(config) = self.inner.config.as_ref() else {
            return Ok(());
        };
        let Some(session) = self.current_session() else {
            return Ok(());
        };

        let resp = self
            .inner
            .client
            .post(format!("{}/auth/v1/logout", config.url))
            .header("apikey", &config.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            let body: ProviderErrorBody = resp.json().await.unwrap_or_default();
            return Err(classify(&body.text()));
        }

        *lock(&self.inner.session) = None;
        self.notify(AuthEvent::SignedOut, None);
        Ok(())
    }
}
