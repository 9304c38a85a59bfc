use std::{env, str::FromStr as _};

use strum::{Display, EnumString};

const ENVIRONMENT_VARIABLE: &str = "APP_ENVIRONMENT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    /// Read `APP_ENVIRONMENT`, falling back to development when unset or unknown.
    #[must_use]
    pub fn from_env() -> Self {
        env::var(ENVIRONMENT_VARIABLE)
            .ok()
            .and_then(|s| Self::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Name of the config file under `config/`, without extension.
    #[must_use]
    pub fn config_file(self) -> String {
        format!("config/{self}")
    }
}
