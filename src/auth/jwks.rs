use std::collections::HashMap;

use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::DecodingKey;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::AuthError;

/// Read-through cache of the issuer's public signing keys, keyed by kid.
///
/// Refreshed on cache miss. Staleness against key rotation is acceptable and
/// concurrent refreshes are harmless, so there is no locking beyond the map
/// itself.
pub struct JwksCache {
    url: String,
    http: reqwest::Client,
    keys: RwLock<HashMap<String, Jwk>>,
}

impl JwksCache {
    pub fn new(url: String) -> Self {
        Self {
            url,
            http: reqwest::Client::new(),
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve the decoding key for a token's kid, fetching the JWKS document
    /// if the kid is not cached yet.
    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        // Fast path: try read lock
        {
            let keys = self.keys.read().await;
            if let Some(jwk) = keys.get(kid) {
                return Self::to_decoding_key(jwk);
            }
        }

        self.refresh().await?;

        let keys = self.keys.read().await;
        match keys.get(kid) {
            Some(jwk) => Self::to_decoding_key(jwk),
            None => Err(AuthError::invalid_header(
                "Unable to find the appropriate key.",
            )),
        }
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        let jwks: JwkSet = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|err| {
                warn!("failed to fetch signing keys from {}: {}", self.url, err);
                AuthError::verification_failed()
            })?
            .json()
            .await
            .map_err(|err| {
                warn!("failed to parse JWKS document from {}: {}", self.url, err);
                AuthError::verification_failed()
            })?;

        let mut keys = self.keys.write().await;
        for jwk in jwks.keys {
            if let Some(kid) = jwk.common.key_id.clone() {
                keys.insert(kid, jwk);
            }
        }
        info!("refreshed signing keys from {} ({} cached)", self.url, keys.len());
        Ok(())
    }

    fn to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
        DecodingKey::from_jwk(jwk).map_err(|err| {
            warn!("unusable signing key in JWKS: {}", err);
            AuthError::invalid_header("Unable to use the matched signing key.")
        })
    }
}
