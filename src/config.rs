use crate::domain::{ApiLogin, Host, LogFormat, LogLevel, Port, TimeoutSecs, UpstreamBaseUrl};
use crate::proxy::types::RequestSizeLimit;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub use config::ConfigError;

/// Prefix for structured environment overrides, e.g. `IIKO_RELAY__SERVER__HOST`
pub const ENV_PREFIX: &str = "IIKO_RELAY";

/// Listening port, kept unprefixed for platform compatibility (Render, Heroku)
pub const PORT_VAR: &str = "PORT";

/// The iiko `apiLogin` secret
pub const API_LOGIN_VAR: &str = "IIKO_API_LOGIN";

/// Selects `config/<environment>` on top of `config/default`
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";

/// Optional dotenv file read from the working directory
pub const ENV_FILE: &str = ".env";

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub upstream: UpstreamSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: Host,
    pub port: Port,
    pub max_request_bytes: RequestSizeLimit,
}

#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub base_url: UpstreamBaseUrl,
    pub timeout_secs: TimeoutSecs,
    pub api_login: Option<ApiLogin>,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LogLevel,
    pub format: LogFormat,
}

/// Settings as layered by `config`, before validation
#[derive(Debug, Deserialize)]
struct RawSettings {
    server: RawServerSettings,
    upstream: RawUpstreamSettings,
    logging: RawLoggingSettings,
}

#[derive(Debug, Deserialize)]
struct RawServerSettings {
    host: String,
    port: u16,
    max_request_bytes: usize,
}

#[derive(Debug, Deserialize)]
struct RawUpstreamSettings {
    base_url: String,
    timeout_secs: u64,
    #[serde(default)]
    api_login: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLoggingSettings {
    level: String,
    format: String,
}

impl Settings {
    /// Load settings from `./config`, `./.env` and the process environment
    pub fn new() -> Result<Self, ConfigError> {
        let vars = with_env_file(Path::new(ENV_FILE), std::env::vars().collect())?;
        Self::load(Path::new("config"), vars)
    }

    /// Load settings from `config_dir` and an explicit variable map
    ///
    /// Precedence, lowest first: built-in defaults, `default` file,
    /// `<ENVIRONMENT>` file, `local` file, `IIKO_RELAY__*` variables,
    /// then `PORT` and `IIKO_API_LOGIN`.
    pub fn load(config_dir: &Path, vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let environment =
            non_empty(&vars, ENVIRONMENT_VAR).unwrap_or_else(|| "development".to_string());
        let file = |name: &str| {
            File::with_name(&config_dir.join(name).to_string_lossy()).required(false)
        };

        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.max_request_bytes", 1024 * 1024)?
            .set_default("upstream.base_url", "https://api-ru.iiko.net")?
            .set_default("upstream.timeout_secs", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(file("default"))
            .add_source(file(&environment))
            .add_source(file("local"))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .source(Some(vars.clone())),
            )
            .set_override_option("server.port", non_empty(&vars, PORT_VAR))?
            .set_override_option("upstream.api_login", non_empty(&vars, API_LOGIN_VAR))?
            .build()?;

        config.try_deserialize::<RawSettings>()?.try_into()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl TryFrom<RawSettings> for Settings {
    type Error = ConfigError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        Ok(Self {
            server: ServerSettings {
                host: Host::try_new(raw.server.host).map_err(invalid("server.host"))?,
                port: Port::try_new(raw.server.port).map_err(invalid("server.port"))?,
                max_request_bytes: RequestSizeLimit::try_new(raw.server.max_request_bytes)
                    .map_err(invalid("server.max_request_bytes"))?,
            },
            upstream: UpstreamSettings {
                base_url: UpstreamBaseUrl::try_new(raw.upstream.base_url)
                    .map_err(invalid("upstream.base_url"))?,
                timeout_secs: TimeoutSecs::try_new(raw.upstream.timeout_secs)
                    .map_err(invalid("upstream.timeout_secs"))?,
                // An empty login is treated the same as a missing one
                api_login: raw
                    .upstream
                    .api_login
                    .filter(|login| !login.is_empty())
                    .map(ApiLogin::try_new)
                    .transpose()
                    .map_err(invalid("upstream.api_login"))?,
            },
            logging: LoggingSettings {
                level: raw.logging.level.parse().map_err(invalid("logging.level"))?,
                format: raw
                    .logging
                    .format
                    .parse()
                    .map_err(invalid("logging.format"))?,
            },
        })
    }
}

fn invalid<E: std::fmt::Debug>(key: &'static str) -> impl Fn(E) -> ConfigError {
    move |e| ConfigError::Message(format!("invalid value for `{key}`: {e:?}"))
}

/// Fill gaps in `vars` from a dotenv file
///
/// Variables already present win over the file. A missing file is not an
/// error; a malformed one is.
pub fn with_env_file(
    env_file: &Path,
    mut vars: HashMap<String, String>,
) -> Result<HashMap<String, String>, ConfigError> {
    let entries = match dotenvy::from_path_iter(env_file) {
        Ok(entries) => entries,
        Err(e) if e.not_found() => return Ok(vars),
        Err(e) => return Err(env_file_error(env_file, e)),
    };

    for entry in entries {
        let (key, value) = entry.map_err(|e| env_file_error(env_file, e))?;
        vars.entry(key).or_insert(value);
    }

    Ok(vars)
}

fn env_file_error(env_file: &Path, error: dotenvy::Error) -> ConfigError {
    ConfigError::Message(format!("failed to read {}: {error}", env_file.display()))
}

fn non_empty(vars: &HashMap<String, String>, key: &str) -> Option<String> {
    vars.get(key).filter(|value| !value.is_empty()).cloned()
}
