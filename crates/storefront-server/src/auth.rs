use crate::routes::{ApiError, AppState};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use std::time::{SystemTime, UNIX_EPOCH};
use storefront_core::token::{self, SigningKey};
use storefront_core::{Result, StoreError};

pub const SELLER_HEADER: &str = "x-seller-id";

/// Resolves the calling seller from request headers.
#[derive(Debug, Clone, Default)]
pub struct SellerAuth {
    keys: Vec<SigningKey>,
}

impl SellerAuth {
    pub fn new(keys: Vec<SigningKey>) -> Self {
        Self { keys }
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<String> {
        if self.keys.is_empty() {
            return headers
                .get(SELLER_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .ok_or_else(|| StoreError::Unauthorized("missing seller id".into()));
        }
        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .ok_or_else(|| StoreError::Unauthorized("missing token".into()))?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();
        token::verify(bearer, &self.keys, now).map(|claims| claims.sub)
    }
}

/// The authenticated seller id.
#[derive(Debug, Clone)]
pub struct Seller(pub String);

#[axum::async_trait]
impl FromRequestParts<AppState> for Seller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        state
            .auth
            .authenticate(&parts.headers)
            .map(Seller)
            .map_err(ApiError)
    }
}
