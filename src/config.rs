use anyhow::{Context, Result};
use clap::Parser;
use std::env;

pub const DEV_SECRET_KEY: &str = "bucketlist-dev-secret-change-me";

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub secret_key: String,
    pub token_ttl_secs: i64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("secret_key", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Bucketlist tracker API")]
pub struct Args {
    /// Host to bind to (overrides BUCKETLIST_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides BUCKETLIST_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides BUCKETLIST_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Token signing secret (overrides BUCKETLIST_SECRET_KEY)
    #[arg(long)]
    pub secret_key: Option<String>,

    /// Token lifetime in seconds (overrides BUCKETLIST_TOKEN_TTL_SECS)
    #[arg(long)]
    pub token_ttl_secs: Option<i64>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        let cfg = Self::resolve(args, |key| env::var(key))?;
        Ok((cfg, migrate))
    }

    /// Merge CLI values over `lookup`-provided environment values over defaults.
    pub fn resolve<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        // --- Environment fallback ---
        let env_host = lookup("BUCKETLIST_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_env(&lookup, "BUCKETLIST_PORT", 5000u16)?;
        let env_db = lookup("BUCKETLIST_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/bucketlist.db".into());
        let env_secret = lookup("BUCKETLIST_SECRET_KEY").ok();
        let env_ttl = parse_env(&lookup, "BUCKETLIST_TOKEN_TTL_SECS", 3600i64)?;

        // --- Merge ---
        let secret_key = match args.secret_key.or(env_secret) {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("BUCKETLIST_SECRET_KEY not set; using the development key");
                DEV_SECRET_KEY.to_string()
            }
        };
        let token_ttl_secs = args.token_ttl_secs.unwrap_or(env_ttl);
        if token_ttl_secs <= 0 {
            anyhow::bail!("token lifetime must be positive, got {}", token_ttl_secs);
        }

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            secret_key,
            token_ttl_secs,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Result<String, env::VarError>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, env::VarError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned().ok_or(env::VarError::NotPresent)
    }

    #[test]
    fn defaults_apply_without_env_or_flags() {
        let cfg = AppConfig::resolve(Args::default(), env_of(&[])).unwrap();
        assert_eq!(cfg.addr(), "0.0.0.0:5000");
        assert_eq!(cfg.database_url, "sqlite://./data/bucketlist.db");
        assert_eq!(cfg.secret_key, DEV_SECRET_KEY);
        assert_eq!(cfg.token_ttl_secs, 3600);
    }

    #[test]
    fn flags_override_environment() {
        let env = env_of(&[
            ("BUCKETLIST_PORT", "8080"),
            ("BUCKETLIST_SECRET_KEY", "from-env"),
            ("BUCKETLIST_TOKEN_TTL_SECS", "60"),
        ]);
        let args = Args::try_parse_from(["bucketlist-api", "--port", "9000"]).unwrap();

        let cfg = AppConfig::resolve(args, env).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.secret_key, "from-env");
        assert_eq!(cfg.token_ttl_secs, 60);
    }

    #[test]
    fn malformed_port_is_an_error() {
        let err = AppConfig::resolve(Args::default(), env_of(&[("BUCKETLIST_PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("BUCKETLIST_PORT"));
    }

    #[test]
    fn debug_output_hides_secret() {
        let cfg = AppConfig::resolve(
            Args::default(),
            env_of(&[("BUCKETLIST_SECRET_KEY", "s3cr3t")]),
        )
        .unwrap();
        assert!(!format!("{:?}", cfg).contains("s3cr3t"));
    }
}
