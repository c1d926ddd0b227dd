use anyhow::Context;
use std::{env, net::SocketAddr, path::PathBuf, str::FromStr};
use storefront_core::token::SigningKey;
use tracing::{info, warn};

pub struct Config {
    pub http_addr: SocketAddr,
    /// Empty means open mode: the seller comes from `X-Seller-Id`.
    pub seller_keys: Vec<SigningKey>,
    pub media_dir: PathBuf,
    pub media_base_url: String,
    pub tls: Option<TlsPaths>,
    pub max_upload_bytes: usize,
}

pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut seller_keys = Vec::new();
        // active first, then the rotation key
        for (secret_var, id_var, default_id) in [
            ("SELLER_KEY_ACTIVE", "SELLER_KEY_ACTIVE_ID", "active"),
            ("SELLER_KEY_NEXT", "SELLER_KEY_NEXT_ID", "next"),
        ] {
            if let Some(secret) = var(secret_var) {
                seller_keys.push(SigningKey {
                    kid: var(id_var).unwrap_or_else(|| default_id.to_string()),
                    secret,
                });
            }
        }
        if seller_keys.is_empty() {
            warn!("no seller signing key configured, trusting X-Seller-Id");
        }
        let tls = match (var("TLS_CERT_PATH"), var("TLS_KEY_PATH")) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => anyhow::bail!("TLS_CERT_PATH and TLS_KEY_PATH must be set together"),
        };
        Ok(Self {
            http_addr: try_load(var("HTTP_ADDR"), "HTTP_ADDR", "0.0.0.0:8080")?,
            seller_keys,
            media_dir: try_load(var("MEDIA_DIR"), "MEDIA_DIR", "./media")?,
            media_base_url: try_load(var("MEDIA_BASE_URL"), "MEDIA_BASE_URL", "/media")?,
            tls,
            max_upload_bytes: try_load(var("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES", "10485760")?,
        })
    }
}

fn try_load<T>(value: Option<String>, key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = value.unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .with_context(|| format!("invalid {key} value: {raw:?}"))
}
