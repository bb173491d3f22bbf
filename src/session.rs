// src/session.rs
use log::{error, info, warn};

use crate::api::ApiClient;
use crate::auth::is_token_expired;
use crate::error::{ApiError, ValidationError};
use crate::models::{AuthResponse, User};
use crate::routes::Route;

/// Lifecycle of the signed-in user.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Loading,
    Authenticated(User),
    Anonymous,
}

/// The process-wide session, passed explicitly to every page and form.
pub struct SessionContext {
    api: ApiClient,
    state: SessionState,
    route: Route,
}

impl SessionContext {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: SessionState::Uninitialized,
            route: Route::Home,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self.state,
            SessionState::Uninitialized | SessionState::Loading
        )
    }

    /// Preferred currency of the signed-in user, USD otherwise.
    pub fn currency(&self) -> &str {
        self.user()
            .map(|u| u.preferred_currency.as_str())
            .unwrap_or("USD")
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn navigate(&mut self, route: Route) {
        info!("Navigating to {}", route);
        self.route = route;
    }

    /// Resolves a stored token into a user. Never fails; problems downgrade to anonymous.
    pub async fn initialize(&mut self) {
        self.state = SessionState::Loading;

        let Some(token) = self.api.tokens().get() else {
            self.state = SessionState::Anonymous;
            return;
        };

        if is_token_expired(&token) {
            warn!("Stored token has expired, discarding it");
            self.drop_token();
            self.state = SessionState::Anonymous;
            return;
        }

        match self.api.get_current_user().await {
            Ok(user) => {
                info!("Restored session for {}", user.username);
                self.state = SessionState::Authenticated(user);
            }
            Err(e) => {
                error!("Auth check failed: {}", e);
                self.drop_token();
                self.state = SessionState::Anonymous;
            }
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ApiError> {
        let previous = std::mem::replace(&mut self.state, SessionState::Loading);
        match self.api.login(username, password).await {
            Ok(response) => self.accept(response),
            Err(e) => {
                error!("Login failed: {}", e);
                self.state = previous;
                Err(e)
            }
        }
    }

    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let previous = std::mem::replace(&mut self.state, SessionState::Loading);
        match self.api.register(username, email, password).await {
            Ok(response) => self.accept(response),
            Err(e) => {
                error!("Registration failed: {}", e);
                self.state = previous;
                Err(e)
            }
        }
    }

    fn accept(&mut self, response: AuthResponse) -> Result<(), ApiError> {
        if let Err(e) = self.api.tokens().set(&response.token) {
            self.state = SessionState::Anonymous;
            return Err(e.into());
        }
        let user = response.user();
        info!("Signed in as {}", user.username);
        self.state = SessionState::Authenticated(user);
        self.navigate(Route::Dashboard);
        Ok(())
    }

    pub fn logout(&mut self) {
        self.drop_token();
        self.state = SessionState::Anonymous;
        self.navigate(Route::Home);
    }

    /// Persists the currency on the backend, then merges it into the in-memory user.
    pub async fn update_currency(&mut self, currency: &str) -> Result<(), ApiError> {
        if let Err(e) = self.api.update_preferred_currency(currency).await {
            error!("Currency update failed: {}", e);
            return Err(e);
        }
        if let SessionState::Authenticated(user) = &mut self.state {
            user.preferred_currency = currency.to_string();
        }
        Ok(())
    }

    /// Where a request for `route` actually lands given the current session.
    pub fn guard(&mut self, route: Route) -> Route {
        let target = if route.is_protected() && self.user().is_none() && !self.is_loading() {
            Route::Login
        } else {
            route
        };
        self.navigate(target.clone());
        target
    }

    fn drop_token(&self) {
        if let Err(e) = self.api.tokens().clear() {
            error!("Failed to clear stored token: {}", e);
        }
    }
}

/// Rejects an empty login form before it reaches the backend.
pub fn validate_credentials(username: &str, password: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}
