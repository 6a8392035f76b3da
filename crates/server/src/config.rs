//! Runtime settings read from flags or the environment (`.env` is loaded
//! first by the binaries).

use std::path::PathBuf;

use clap::Args;
use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-only-secret-change-me";

#[derive(Debug, Clone, Args)]
pub struct DatabaseConfig {
    /// SQLite connection string.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://database.sqlite")]
    pub database_url: String,

    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 1)]
    pub db_max_connections: u32,
}

#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Secret used to sign bearer tokens.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Lifetime of issued bearer tokens.
    #[arg(long, env = "TOKEN_TTL_HOURS", default_value_t = 720)]
    pub token_ttl_hours: i64,

    /// bcrypt work factor for new password hashes.
    #[arg(long, env = "PASSWORD_COST", default_value_t = utils::password::DEFAULT_COST)]
    pub password_cost: u32,

    /// Directory served for every path outside `/api`.
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    #[command(flatten)]
    pub database: DatabaseConfig,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured secret, or a fixed development secret with a warning.
    pub fn jwt_secret(&self) -> &str {
        match self.jwt_secret.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                warn!("JWT_SECRET is not set, using the development secret");
                DEV_JWT_SECRET
            }
        }
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours.max(1))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        config: ServerConfig,
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "server",
            "--port",
            "8080",
            "--jwt-secret",
            "s3cret",
            "--database-url",
            "sqlite::memory:",
            "--password-cost",
            "8",
        ]);
        assert_eq!(cli.config.password_cost, 8);
        assert_eq!(cli.config.port, 8080);
        assert_eq!(cli.config.jwt_secret(), "s3cret");
        assert_eq!(cli.config.database.database_url, "sqlite::memory:");
        assert!(cli.config.bind_addr().ends_with(":8080"));
    }

    #[test]
    fn empty_secret_falls_back_to_development_secret() {
        let cli = Cli::parse_from(["server", "--jwt-secret", ""]);
        assert_eq!(cli.config.jwt_secret(), DEV_JWT_SECRET);
        assert_eq!(cli.config.token_ttl(), chrono::Duration::hours(cli.config.token_ttl_hours));
    }
}
