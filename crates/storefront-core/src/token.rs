//! Seller tokens: `kid.payload.sig`, payload is JSON claims, signature is
//! HMAC-SHA256 over the raw payload bytes. Both parts are URL-safe base64
//! without padding.

use crate::errors::{Result, StoreError};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as b64, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerClaims {
    pub sub: String,
    /// Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct SigningKey {
    pub kid: String,
    pub secret: String,
}

fn mac_for(secret: &str) -> Result<Hmac<Sha256>> {
    <Hmac<Sha256>>::new_from_slice(secret.as_bytes())
        .map_err(|e| StoreError::Internal(format!("hmac key: {e}")))
}

pub fn sign(key: &SigningKey, claims: &SellerClaims) -> Result<String> {
    let payload =
        serde_json::to_vec(claims).map_err(|e| StoreError::Internal(e.to_string()))?;
    let mut mac = mac_for(&key.secret)?;
    mac.update(&payload);
    let sig = mac.finalize().into_bytes();
    Ok(format!("{}.{}.{}", key.kid, b64.encode(&payload), b64.encode(sig)))
}

/// Checks signature against the key named by the token's kid, then expiry.
pub fn verify(token: &str, keys: &[SigningKey], now: i64) -> Result<SellerClaims> {
    let unauthorized = |msg: &str| StoreError::Unauthorized(msg.to_string());
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(unauthorized("bad token"));
    }
    let key = keys
        .iter()
        .find(|k| k.kid == parts[0])
        .ok_or_else(|| unauthorized("unknown kid"))?;
    let payload = b64.decode(parts[1]).map_err(|_| unauthorized("bad b64"))?;
    let sig = b64.decode(parts[2]).map_err(|_| unauthorized("bad b64"))?;
    let mut mac = mac_for(&key.secret)?;
    mac.update(&payload);
    mac.verify_slice(&sig).map_err(|_| unauthorized("bad sig"))?;
    let claims: SellerClaims =
        serde_json::from_slice(&payload).map_err(|_| unauthorized("bad claims"))?;
    if claims.sub.is_empty() {
        return Err(unauthorized("missing subject"));
    }
    if matches!(claims.exp, Some(exp) if exp < now) {
        return Err(unauthorized("expired"));
    }
    Ok(claims)
}
