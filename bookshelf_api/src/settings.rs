use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: i64 = 9000;

/// Server settings, layered from defaults, an optional `bookshelf.{toml,yaml,json}` file,
/// `BOOKSHELF_*` environment variables and finally a plain `PORT` variable.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub jaeger_enabled: bool,
    pub log_level: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_sources(
            Environment::with_prefix("BOOKSHELF").try_parsing(true),
            std::env::var("PORT").ok(),
        )
    }

    fn from_sources(
        environment: Environment,
        port_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", DEFAULT_PORT)?
            .set_default("jaeger_enabled", false)?
            .set_default("log_level", "info")?
            .add_source(File::with_name("bookshelf").required(false))
            .add_source(environment)
            .set_override_option("port", port_override)?
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod settings_tests {
    use config::{Environment, Map};

    use super::*;

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let source: Map<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Environment::with_prefix("BOOKSHELF")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_sources(environment(&[]), None).expect("Failed to load");
        assert_eq!(
            settings,
            Settings {
                host: "localhost".to_string(),
                port: 9000,
                jaeger_enabled: false,
                log_level: "info".to_string(),
            }
        );
    }

    #[test]
    fn test_prefixed_environment_overrides_defaults() {
        let settings = Settings::from_sources(
            environment(&[
                ("BOOKSHELF_HOST", "0.0.0.0"),
                ("BOOKSHELF_PORT", "8080"),
                ("BOOKSHELF_JAEGER_ENABLED", "true"),
                ("BOOKSHELF_LOG_LEVEL", "debug"),
            ]),
            None,
        )
        .expect("Failed to load");
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 8080);
        assert!(settings.jaeger_enabled);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_plain_port_wins() {
        let settings = Settings::from_sources(
            environment(&[("BOOKSHELF_PORT", "8080")]),
            Some("5000".to_string()),
        )
        .expect("Failed to load");
        assert_eq!(settings.port, 5000);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let settings = Settings::from_sources(environment(&[]), Some("not a port".to_string()));
        assert!(settings.is_err());
    }
}
