use std::path::PathBuf;

/// Backend root used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8001/api";

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub api_url: String,
    pub timeout_secs: u64,
    /// Tracing filter directive, `RUST_LOG` takes precedence.
    pub log: String,
    pub download_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            log: "warn".to_string(),
            download_dir: None,
        }
    }
}

impl Settings {
    /// Directory downloads land in when `--out` is not given.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let defaults = Settings::default();
    let file = std::env::var("KANTIK_CONFIG").unwrap_or_else(|_| "kantik".to_string());

    // defaults < kantik.{yaml,toml} < KANTIK_* variables
    let settings = config::Config::builder()
        .set_default("api_url", defaults.api_url)?
        .set_default("timeout_secs", defaults.timeout_secs)?
        .set_default("log", defaults.log)?
        .add_source(config::File::with_name(&file).required(false))
        .add_source(config::Environment::with_prefix("KANTIK").try_parsing(true))
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.timeout_secs, 30);
        assert_eq!(settings.log, "warn");
        assert_eq!(settings.download_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_file_source_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kantik.yaml");
        std::fs::write(
            &path,
            "api_url: https://kantik.example/api\ndownload_dir: /tmp/charts\n",
        )
        .unwrap();

        let settings: Settings = config::Config::builder()
            .set_default("api_url", DEFAULT_API_URL)
            .unwrap()
            .set_default("timeout_secs", 30)
            .unwrap()
            .set_default("log", "warn")
            .unwrap()
            .add_source(config::File::from(path))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.api_url, "https://kantik.example/api");
        assert_eq!(settings.timeout_secs, 30);
        assert_eq!(settings.download_dir(), PathBuf::from("/tmp/charts"));
    }
}
