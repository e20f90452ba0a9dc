use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "nexa.toml",
    "config/nexa.toml",
    "crates/config/nexa.toml",
    "../nexa.toml",
    "../config/nexa.toml",
    "backend/nexa.toml",
    "backend/config/nexa.toml",
];

/// Variables understood by earlier deployments of the backend. They are
/// applied on top of every other source.
const LEGACY_JWT_SECRET: &str = "JWT_SECRET";
const LEGACY_JWT_EXPIRES_IN: &str = "JWT_EXPIRES_IN";
const LEGACY_PORT: &str = "PORT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 5001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://nexa.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret. Startup fails when this is unset.
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "AuthConfig::default_token_ttl")]
    pub token_ttl_seconds: u64,
    #[serde(default = "AuthConfig::default_issuer")]
    pub issuer: String,
    #[serde(default = "AuthConfig::default_audience")]
    pub audience: String,
    #[serde(default)]
    pub password: PasswordHashConfig,
}

impl AuthConfig {
    const fn default_token_ttl() -> u64 {
        7 * 24 * 60 * 60
    }

    fn default_issuer() -> String {
        "nexa".to_string()
    }

    fn default_audience() -> String {
        "nexa-users".to_string()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_seconds: Self::default_token_ttl(),
            issuer: Self::default_issuer(),
            audience: Self::default_audience(),
            password: PasswordHashConfig::default(),
        }
    }
}

// Hand-written so the secret never reaches the logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("password", &self.password)
            .finish()
    }
}

/// Argon2id cost parameters.
///
/// ```
/// use nexa_config::PasswordHashConfig;
///
/// let params = PasswordHashConfig::default();
/// assert_eq!(params.memory_kib, 19_456);
/// assert_eq!(params.iterations, 2);
/// assert_eq!(params.parallelism, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordHashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Parse a token lifetime such as `7d`, `12h`, `30m`, `45s` or a bare number
/// of seconds.
///
/// ```
/// use nexa_config::parse_duration_seconds;
///
/// assert_eq!(parse_duration_seconds("7d"), Some(604_800));
/// assert_eq!(parse_duration_seconds("90"), Some(90));
/// assert_eq!(parse_duration_seconds("soon"), None);
/// ```
pub fn parse_duration_seconds(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (digits, multiplier) = match value.chars().last()? {
        'd' => (&value[..value.len() - 1], 86_400),
        'h' => (&value[..value.len() - 1], 3_600),
        'm' => (&value[..value.len() - 1], 60),
        's' => (&value[..value.len() - 1], 1),
        _ => (value, 1),
    };

    digits
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|amount| amount.checked_mul(multiplier))
        .filter(|seconds| *seconds > 0)
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use nexa_config::load;
///
/// std::env::remove_var("NEXA_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let token_ttl = i64::try_from(defaults.auth.token_ttl_seconds).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("auth.token_ttl_seconds", token_ttl)?
        .set_default("auth.issuer", defaults.auth.issuer.clone())?
        .set_default("auth.audience", defaults.auth.audience.clone())?
        .set_default(
            "auth.password.memory_kib",
            i64::from(defaults.auth.password.memory_kib),
        )?
        .set_default(
            "auth.password.iterations",
            i64::from(defaults.auth.password.iterations),
        )?
        .set_default(
            "auth.password.parallelism",
            i64::from(defaults.auth.password.parallelism),
        )?;

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("NEXA_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via NEXA_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(config::Environment::with_prefix("NEXA").separator("__"));
    builder = apply_legacy_overrides(builder)?;

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.auth.token_ttl_seconds > i64::MAX as u64 {
        config.auth.token_ttl_seconds = i64::MAX as u64;
    }

    if config
        .auth
        .jwt_secret
        .as_deref()
        .is_some_and(|secret| secret.trim().is_empty())
    {
        config.auth.jwt_secret = None;
    }

    debug!(?config, "loaded backend configuration");
    Ok(config)
}

fn apply_legacy_overrides(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    let mut builder = builder.set_override_option("auth.jwt_secret", read_env(LEGACY_JWT_SECRET))?;

    if let Some(raw) = read_env(LEGACY_JWT_EXPIRES_IN) {
        let seconds = parse_duration_seconds(&raw)
            .ok_or_else(|| anyhow!("{LEGACY_JWT_EXPIRES_IN} has an unsupported value: {raw}"))?;
        let seconds = i64::try_from(seconds).unwrap_or(i64::MAX);
        builder = builder.set_override("auth.token_ttl_seconds", seconds)?;
    }

    if let Some(raw) = read_env(LEGACY_PORT) {
        let port: u16 = raw
            .trim()
            .parse()
            .with_context(|| format!("{LEGACY_PORT} is not a valid port: {raw}"))?;
        builder = builder.set_override("http.port", i64::from(port))?;
    }

    Ok(builder)
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
