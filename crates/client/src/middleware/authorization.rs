//! Bearer authorization request stage

use std::sync::Arc;

use profiles_core::CredentialStore;
use reqwest::header::{self, HeaderValue};

use super::RequestStage;

/// Attaches the stored access token as a bearer `Authorization` header
///
/// A missing token, a store read failure or a token that does not form a
/// valid header value all leave the request untouched; the server decides
/// whether an unauthenticated request is acceptable.
pub struct BearerAuth {
    store: Arc<dyn CredentialStore>,
}

impl BearerAuth {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

impl RequestStage for BearerAuth {
    fn apply(&self, request: &mut reqwest::Request) {
        let Ok(Some(token)) = self.store.access_token() else {
            return;
        };
        if token.is_empty() {
            return;
        }
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
            request.headers_mut().insert(header::AUTHORIZATION, value);
        }
    }
}
