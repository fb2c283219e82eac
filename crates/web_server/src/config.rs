use actix_web::cookie::Key;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_BCRYPT_COST: u32 = 12;

/// Where users, campgrounds and reviews are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL at `DATABASE_URL`
    Postgres,
    /// Process memory; everything is lost on restart
    Memory,
}

/// S3 bucket used as the image host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    /// Bucket name
    pub bucket: String,
    /// Base URL the bucket's objects are served from
    pub public_url: String,
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable has a value that cannot be used
    #[error("{name} has an invalid value '{value}'")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
}

/// Server settings read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `BIND_ADDRESS`
    pub bind_address: String,
    /// `STORE_BACKEND`
    pub store_backend: StoreBackend,
    /// `DATABASE_URL`, required for the Postgres backend
    pub database_url: Option<String>,
    /// `SESSION_SECRET`
    pub session_secret: Option<String>,
    /// `SESSION_COOKIE_SECURE`
    pub cookie_secure: bool,
    /// `BCRYPT_COST`
    pub bcrypt_cost: u32,
    /// `MAPTILER_API_KEY`; geocoding is disabled without it
    pub maptiler_api_key: Option<String>,
    /// `S3_BUCKET` and `S3_PUBLIC_URL`; images stay in memory without them
    pub s3: Option<S3Settings>,
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let store_backend = match var("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        let database_url = var("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let cookie_secure = match var("SESSION_COOKIE_SECURE").as_deref() {
            None | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "SESSION_COOKIE_SECURE",
                    value: other.to_string(),
                });
            }
        };

        let bcrypt_cost = match var("BCRYPT_COST") {
            None => DEFAULT_BCRYPT_COST,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|cost| (4..=31).contains(cost))
                .ok_or(ConfigError::Invalid {
                    name: "BCRYPT_COST",
                    value: raw,
                })?,
        };

        let s3 = var("S3_BUCKET").map(|bucket| S3Settings {
            public_url: var("S3_PUBLIC_URL")
                .unwrap_or_else(|| format!("https://{}.s3.amazonaws.com", bucket)),
            bucket,
        });

        Ok(Self {
            bind_address: var("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            store_backend,
            database_url,
            session_secret: var("SESSION_SECRET"),
            cookie_secure,
            bcrypt_cost,
            maptiler_api_key: var("MAPTILER_API_KEY"),
            s3,
        })
    }

    /// Key signing and encrypting the session cookie.
    ///
    /// Falls back to a random key when `SESSION_SECRET` is missing or shorter
    /// than 64 bytes, which signs everyone out on restart.
    pub fn session_key(&self) -> Key {
        match self.session_secret.as_deref() {
            Some(secret) => match Key::try_from(secret.as_bytes()) {
                Ok(key) => key,
                Err(_) => {
                    log::warn!("⚠️ SESSION_SECRET is shorter than 64 bytes, using a random key");
                    Key::generate()
                }
            },
            None => {
                log::warn!("⚠️ SESSION_SECRET not set, using a random key");
                Key::generate()
            }
        }
    }
}
