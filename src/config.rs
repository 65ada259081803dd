use anyhow::{Context, Result};
use clap::Parser;
use std::{env, fmt};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Base64 AES-256 key for stored account credentials.
    pub encryption_key: Option<String>,
    pub admin: Option<AdminBootstrap>,
    /// Write a generated key to stderr once when `encryption_key` is unset.
    pub print_generated_key: bool,
}

/// Administrator account ensured at startup.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Digital estate planning API")]
pub struct Args {
    /// Host to bind to (overrides ESTATE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides ESTATE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides ESTATE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,

    /// Print the generated encryption key to stderr when none is configured
    #[arg(long)]
    pub print_generated_key: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("ESTATE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("ESTATE_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing ESTATE_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading ESTATE_PORT"),
        };
        let env_db = env::var("ESTATE_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/estate.db".into());

        let admin = match (
            optional_var("ESTATE_ADMIN_USERNAME")?,
            optional_var("ESTATE_ADMIN_PASSWORD")?,
        ) {
            (Some(username), Some(password)) => Some(AdminBootstrap {
                email: optional_var("ESTATE_ADMIN_EMAIL")?
                    .unwrap_or_else(|| format!("{}@localhost", username)),
                username,
                password,
            }),
            (None, None) => None,
            _ => anyhow::bail!(
                "ESTATE_ADMIN_USERNAME and ESTATE_ADMIN_PASSWORD must be set together"
            ),
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            encryption_key: optional_var("ESTATE_ENCRYPTION_KEY")?,
            admin,
            print_generated_key: args.print_generated_key,
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Secrets stay out of the startup log.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("encryption_key", &self.encryption_key.as_ref().map(|_| "<set>"))
            .field("admin", &self.admin.as_ref().map(|a| a.username.as_str()))
            .field("print_generated_key", &self.print_generated_key)
            .finish()
    }
}

/// An environment variable that may be absent. Blank counts as absent.
fn optional_var(name: &str) -> Result<Option<String>> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}
