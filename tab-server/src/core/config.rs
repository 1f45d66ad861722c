use crate::auth::JwtConfig;

/// Server configuration, loaded from environment variables.
///
/// | Environment variable | Default | Description |
/// |---|---|---|
/// | SERVER_HOST | 0.0.0.0 | gRPC bind address |
/// | SERVER_PORT | 50051 | gRPC bind port |
/// | DATABASE_HOST | localhost | Postgres host |
/// | DATABASE_PORT | 5432 | Postgres port |
/// | DATABASE_USER | postgres | Postgres user |
/// | DATABASE_PASSWORD | (empty) | Postgres password |
/// | DATABASE_NAME | restaurant | Postgres database name |
/// | DATABASE_SSL_MODE | disable | Postgres sslmode |
/// | CACHE_HOST | localhost | Redis host |
/// | CACHE_PORT | 6379 | Redis port |
/// | JWT_SECRET | (generated) | HMAC signing secret |
/// | JWT_EXPIRY_MINUTES | 1440 | token lifetime |
/// | TLS_CERT_PATH / TLS_KEY_PATH | unset | PEM pair; plaintext if unset |
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub jwt: JwtConfig,
    pub environment: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: String,
}

impl DatabaseConfig {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.user, self.password, self.host, self.port, self.database, self.ssl_mode
        )
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub host: String,
    pub port: u16,
}

impl CacheConfig {
    pub fn connection_string(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// development defaults for anything unset.
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, generating an ephemeral development secret");
            crate::auth::jwt::generate_secure_printable_secret()
        });

        Self {
            server: ServerConfig {
                host: env_or("SERVER_HOST", "0.0.0.0"),
                port: env_parsed_or("SERVER_PORT", 50051),
                tls_cert_path: std::env::var("TLS_CERT_PATH").ok(),
                tls_key_path: std::env::var("TLS_KEY_PATH").ok(),
            },
            database: DatabaseConfig {
                host: env_or("DATABASE_HOST", "localhost"),
                port: env_parsed_or("DATABASE_PORT", 5432),
                user: env_or("DATABASE_USER", "postgres"),
                password: env_or("DATABASE_PASSWORD", ""),
                database: env_or("DATABASE_NAME", "restaurant"),
                ssl_mode: env_or("DATABASE_SSL_MODE", "disable"),
            },
            cache: CacheConfig {
                host: env_or("CACHE_HOST", "localhost"),
                port: env_parsed_or("CACHE_PORT", 6379),
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expiry_minutes: env_parsed_or("JWT_EXPIRY_MINUTES", 1440),
            },
            environment: env_or("ENVIRONMENT", "development"),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
