//! JWKS (JSON Web Key Set) fetching with per-key caching
//!
//! - **Per-kid cache**: resolved verification keys are kept in a [`moka`] cache
//!   keyed by key id, so steady-state validation needs no network round trip
//! - **TTL**: cached keys expire (default 10 minutes) so rotated keys are
//!   eventually dropped
//! - **Single flight**: concurrent misses for the same kid share one fetch
//! - **Refetch throttle**: a miss shortly after a fetch is answered from the
//!   last fetched set, which bounds traffic caused by unknown key ids

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use moka::future::Cache;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::KeySourceError;

/// Default timeout for a key-set fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default lifetime of a cached verification key
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// Default minimum interval between two key-set fetches
pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Upper bound on cached keys
pub const DEFAULT_MAX_CACHED_KEYS: u64 = 1024;

/// Resolves a key id to a verification key
///
/// [`TokenValidator`](super::TokenValidator) only depends on this trait.
#[async_trait]
pub trait SigningKeySource: Send + Sync + fmt::Debug {
    /// Resolve the verification key for `kid`
    ///
    /// # Errors
    ///
    /// Returns [`KeySourceError`] if the key id is unknown or the key set
    /// cannot be fetched in time.
    async fn resolve(&self, kid: &str) -> Result<Arc<DecodingKey>, KeySourceError>;
}

/// Key-set URL of a Keycloak-style realm
///
/// ```rust
/// use turbomcp_gate::jwt::keycloak_jwks_uri;
///
/// assert_eq!(
///     keycloak_jwks_uri("https://id.example.com/", "mcp"),
///     "https://id.example.com/realms/mcp/protocol/openid-connect/certs"
/// );
/// ```
pub fn keycloak_jwks_uri(server_url: &str, realm: &str) -> String {
    format!(
        "{}/realms/{}/protocol/openid-connect/certs",
        server_url.trim_end_matches('/'),
        realm
    )
}

/// Tuning knobs for [`JwksKeySource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwksSettings {
    /// Timeout for one key-set fetch
    pub fetch_timeout: Duration,
    /// Lifetime of a cached key
    pub cache_ttl: Duration,
    /// Misses within this interval of the last fetch reuse the fetched set
    pub min_refresh_interval: Duration,
    /// Maximum number of cached keys
    pub max_cached_keys: u64,
}

impl Default for JwksSettings {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            max_cached_keys: DEFAULT_MAX_CACHED_KEYS,
        }
    }
}

#[derive(Clone)]
struct FetchedSet {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
}

/// [`SigningKeySource`] backed by a remote JWKS endpoint
///
/// # Example
///
/// ```rust,no_run
/// # use turbomcp_gate::jwt::{JwksKeySource, JwksSettings, SigningKeySource};
/// # tokio_test::block_on(async {
/// let source = JwksKeySource::new(
///     "https://id.example.com/realms/mcp/protocol/openid-connect/certs",
///     JwksSettings::default(),
/// )?;
///
/// let key = source.resolve("key-id-123").await?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # });
/// ```
#[derive(Clone)]
pub struct JwksKeySource {
    jwks_uri: String,
    http_client: reqwest::Client,
    keys: Cache<String, Arc<DecodingKey>>,
    last_fetch: Arc<RwLock<Option<FetchedSet>>>,
    settings: JwksSettings,
}

// DecodingKey holds key material; only report cache shape
impl fmt::Debug for JwksKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwksKeySource")
            .field("jwks_uri", &self.jwks_uri)
            .field("cached_keys", &self.keys.entry_count())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl JwksKeySource {
    /// Create a key source for `jwks_uri`
    ///
    /// # Errors
    ///
    /// Returns [`KeySourceError::Client`] if the HTTP client cannot be built.
    pub fn new(jwks_uri: impl Into<String>, settings: JwksSettings) -> Result<Self, KeySourceError> {
        let jwks_uri = jwks_uri.into();

        if !jwks_uri.starts_with("https://") {
            warn!(jwks_uri = %jwks_uri, "Key set endpoint is not HTTPS");
        }

        let http_client = reqwest::Client::builder()
            .timeout(settings.fetch_timeout)
            .build()
            .map_err(|e| KeySourceError::Client {
                message: e.to_string(),
            })?;

        let keys = Cache::builder()
            .max_capacity(settings.max_cached_keys)
            .time_to_live(settings.cache_ttl)
            .build();

        Ok(Self {
            jwks_uri,
            http_client,
            keys,
            last_fetch: Arc::new(RwLock::new(None)),
            settings,
        })
    }

    /// Get the JWKS endpoint URI
    pub fn jwks_uri(&self) -> &str {
        &self.jwks_uri
    }

    /// Settings in effect
    pub fn settings(&self) -> &JwksSettings {
        &self.settings
    }

    /// Drop one cached key, forcing the next lookup to refetch
    pub async fn invalidate(&self, kid: &str) {
        self.keys.invalidate(kid).await;
    }

    /// Drop every cached key and the remembered key set
    pub async fn clear(&self) {
        self.keys.invalidate_all();
        *self.last_fetch.write().await = None;
        debug!(jwks_uri = %self.jwks_uri, "Key cache cleared");
    }

    async fn load_key(&self, kid: &str) -> Result<Arc<DecodingKey>, KeySourceError> {
        let set = self.key_set().await?;

        let jwk = set.find(kid).ok_or_else(|| {
            warn!(jwks_uri = %self.jwks_uri, kid, "Key id not present in key set");
            KeySourceError::UnknownKey {
                kid: kid.to_string(),
            }
        })?;

        let key = DecodingKey::from_jwk(jwk).map_err(|e| KeySourceError::UnusableKey {
            kid: kid.to_string(),
            message: e.to_string(),
        })?;

        debug!(jwks_uri = %self.jwks_uri, kid, "Verification key cached");
        Ok(Arc::new(key))
    }

    /// Last fetched set if it is recent enough, otherwise a fresh fetch
    async fn key_set(&self) -> Result<Arc<JwkSet>, KeySourceError> {
        {
            let last = self.last_fetch.read().await;
            if let Some(fetched) = last.as_ref()
                && fetched.fetched_at.elapsed() < self.settings.min_refresh_interval
            {
                debug!(jwks_uri = %self.jwks_uri, "Reusing recently fetched key set");
                return Ok(Arc::clone(&fetched.keys));
            }
        }

        let keys = Arc::new(self.fetch().await?);
        *self.last_fetch.write().await = Some(FetchedSet {
            keys: Arc::clone(&keys),
            fetched_at: Instant::now(),
        });
        Ok(keys)
    }

    async fn fetch(&self) -> Result<JwkSet, KeySourceError> {
        info!(jwks_uri = %self.jwks_uri, "Fetching key set");

        let response = self
            .http_client
            .get(&self.jwks_uri)
            .send()
            .await
            .map_err(|e| {
                warn!(jwks_uri = %self.jwks_uri, error = %e, "Failed to fetch key set");
                KeySourceError::Fetch {
                    uri: self.jwks_uri.clone(),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                jwks_uri = %self.jwks_uri,
                status = %status,
                "Key set endpoint returned error status"
            );
            return Err(KeySourceError::Status {
                uri: self.jwks_uri.clone(),
                status: status.as_u16(),
            });
        }

        let set: JwkSet = response.json().await.map_err(|e| {
            warn!(jwks_uri = %self.jwks_uri, error = %e, "Failed to parse key set");
            KeySourceError::Decode {
                uri: self.jwks_uri.clone(),
                message: e.to_string(),
            }
        })?;

        info!(
            jwks_uri = %self.jwks_uri,
            keys = set.keys.len(),
            "Fetched key set"
        );
        Ok(set)
    }
}

#[async_trait]
impl SigningKeySource for JwksKeySource {
    async fn resolve(&self, kid: &str) -> Result<Arc<DecodingKey>, KeySourceError> {
        self.keys
            .try_get_with(kid.to_string(), self.load_key(kid))
            .await
            .map_err(|e| (*e).clone())
    }
}
