use std::env;
use std::fmt;

const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Runtime configuration, read once at startup.
///
/// `JWT_SECRET` has no default: a server that would sign tokens with a guessable key
/// refuses to start instead.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
    pub database_max_connections: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has invalid value {:?}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let server_port = match lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            Some(value) => parse(value, "SERVER_PORT")?,
            None => DEFAULT_SERVER_PORT,
        };

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(value) => {
                let cost: u32 = parse(value.clone(), "BCRYPT_COST")?;
                // bcrypt only accepts costs in 4..=31
                if !(4..=31).contains(&cost) {
                    return Err(ConfigError::Invalid {
                        key: "BCRYPT_COST",
                        value,
                    });
                }
                cost
            }
            None => bcrypt::DEFAULT_COST,
        };

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => parse(value, "DATABASE_MAX_CONNECTIONS")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_port,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            jwt_secret: required("JWT_SECRET")?,
            bcrypt_cost,
            database_max_connections,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse<T: std::str::FromStr>(value: String, key: &'static str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}
