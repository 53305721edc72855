//! Application state for auth.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::service::AuthService;

/// Shared state for auth handlers and the [`crate::CurrentUser`] extractor.
#[derive(Clone)]
pub struct AuthState {
    pub service: Arc<AuthService>,
}

impl AuthState {
    pub fn new(service: AuthService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Allows AuthState to be extracted from a parent state.
impl<S> FromRef<S> for AuthState
where
    S: AsRef<AuthState>,
{
    fn from_ref(state: &S) -> Self {
        state.as_ref().clone()
    }
}
