use anyhow::{bail, Context};
use sqlx::postgres::PgSslMode;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub port: u16,
    pub ssl_mode: PgSslMode,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database = DatabaseConfig {
            host: var("PGHOST", "localhost"),
            database: var("PGDATABASE", "postgres"),
            user: var("PGUSER", "postgres"),
            password: var("PGPASSWORD", ""),
            port: var("PGPORT", "5432")
                .parse::<u16>()
                .context("PGPORT must be a valid port number")?,
            ssl_mode: parse_ssl_mode(&var("PGSSLMODE", "require"))?,
            max_connections: var("PG_MAX_CONNECTIONS", "10")
                .parse::<u32>()
                .context("PG_MAX_CONNECTIONS must be a positive integer")?,
        };
        if database.max_connections == 0 {
            bail!("PG_MAX_CONNECTIONS must be greater than zero");
        }

        Ok(Self {
            database,
            host: var("APP_HOST", "0.0.0.0"),
            port: var("PORT", "3000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
        })
    }
}

// Certificates are never verified against a CA, so the verifying modes are refused.
fn parse_ssl_mode(raw: &str) -> anyhow::Result<PgSslMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "require" => Ok(PgSslMode::Require),
        "prefer" => Ok(PgSslMode::Prefer),
        "disable" => Ok(PgSslMode::Disable),
        other => bail!("PGSSLMODE `{other}` is not supported (use require, prefer or disable)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let cfg = config_from(&[]).expect("defaults are valid");
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.database.port, 5432);
        assert_eq!(cfg.database.max_connections, 10);
        assert!(matches!(cfg.database.ssl_mode, PgSslMode::Require));
    }

    #[test]
    fn reads_store_parameters() {
        let cfg = config_from(&[
            ("PGHOST", "db.internal"),
            ("PGDATABASE", "amparo"),
            ("PGUSER", "svc"),
            ("PGPASSWORD", "s3cret"),
            ("PGPORT", "6543"),
            ("PGSSLMODE", "disable"),
            ("PORT", "8081"),
        ])
        .expect("valid config");
        assert_eq!(cfg.database.host, "db.internal");
        assert_eq!(cfg.database.database, "amparo");
        assert_eq!(cfg.database.user, "svc");
        assert_eq!(cfg.database.password, "s3cret");
        assert_eq!(cfg.database.port, 6543);
        assert!(matches!(cfg.database.ssl_mode, PgSslMode::Disable));
        assert_eq!(cfg.port, 8081);
    }

    #[test]
    fn rejects_bad_port() {
        let err = config_from(&[("PGPORT", "not-a-port")]).unwrap_err();
        assert!(err.to_string().contains("PGPORT"));
    }

    #[test]
    fn rejects_verifying_ssl_mode() {
        let err = config_from(&[("PGSSLMODE", "verify-full")]).unwrap_err();
        assert!(err.to_string().contains("verify-full"));
    }

    #[test]
    fn rejects_empty_pool() {
        assert!(config_from(&[("PG_MAX_CONNECTIONS", "0")]).is_err());
    }
}
