use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;

/// Environment variables understood without the `RELAY_` prefix, and the
/// config key each one lands on.
const LEGACY_ENV_KEYS: [(&str, &str); 4] = [
    ("mealime_email", "upstream.email"),
    ("mealime_password", "upstream.password"),
    ("token", "token"),
    ("port", "port"),
];

/// Keys whose environment values are taken verbatim. Figment would otherwise
/// parse `TOKEN=007` into the number 7.
const SECRET_KEYS: [&str; 3] = ["token", "upstream.email", "upstream.password"];

/// Main config for the relay: listener, bearer secret, upstream account and logging.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    /// Shared secret expected in `Authorization: Bearer <token>`.
    /// Unset or empty makes every protected route answer 500.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigV1 {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured bearer token, treating an empty value as absent.
    pub fn expected_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}

impl Default for ConfigV1 {
    fn default() -> Self {
        ConfigV1 {
            token: None,
            host: default_host(),
            port: default_port(),
            upstream: UpstreamConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Account and endpoint of the grocery-list service we relay to.
/// Credentials are optional here; their absence only surfaces on first login.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct UpstreamConfig {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            email: None,
            password: None,
            base_url: default_base_url(),
            timeout_in_ms: default_timeout_in_ms(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_base_url() -> String {
    "https://app.mealime.com".to_string()
}

fn default_timeout_in_ms() -> u64 {
    30_000
}

/// Bare variables from the original deployment, renamed onto config keys.
fn legacy_env() -> Env {
    Env::raw()
        .only(&LEGACY_ENV_KEYS.map(|(env, _)| env))
        .map(|key| {
            let name = key.as_str().to_ascii_lowercase();
            match LEGACY_ENV_KEYS.iter().find(|(env, _)| *env == name) {
                Some((_, target)) => (*target).into(),
                None => key.as_str().into(),
            }
        })
}

fn prefixed_env() -> Env {
    Env::prefixed("RELAY_").split("__")
}

/// Layered configuration: `./config.yaml`, then `RELAY_*` variables
/// (`__` nests), then the bare legacy variables. Secrets coming from the
/// environment are re-merged as unparsed strings in the same order.
pub fn figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Yaml::file("./config.yaml"))
        .merge(prefixed_env())
        .merge(legacy_env());

    let (prefixed, legacy) = (prefixed_env(), legacy_env());
    for (key, raw) in prefixed.iter().chain(legacy.iter()) {
        let key = key.as_str().to_ascii_lowercase();
        if SECRET_KEYS.contains(&key.as_str()) {
            figment = figment.merge(Serialized::global(&key, raw));
        }
    }
    figment
}

/// Load the relay configuration. Exits the process if it cannot be extracted.
pub fn load_config() -> ConfigV1 {
    match figment().extract::<ConfigV1>() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(ConfigV1);
    match serde_json::to_string_pretty(&schema) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error rendering configuration schema: {}", e),
    }
}
