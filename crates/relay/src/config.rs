use std::{fs, net::SocketAddr, path::Path};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_DOWNSTREAM_URL: &str = "https://script.google.com/macros/s/AKfycbxMh707Oq-U0NFflYNpcQKT662hC-aMeDKIIwClr-14fAs63JcQ5BYO39CMCQLPVNmTXg/exec";

pub const SETTINGS_FILE: &str = "relay.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub downstream_url: String,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".into(),
            downstream_url: DEFAULT_DOWNSTREAM_URL.into(),
            max_body_bytes: 64 * 1024,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    downstream_url: Option<String>,
    max_body_bytes: Option<usize>,
}

impl Settings {
    pub fn bind_socket_addr(&self) -> anyhow::Result<SocketAddr> {
        self.bind_addr
            .parse()
            .with_context(|| format!("invalid bind address '{}'", self.bind_addr))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.bind_socket_addr()?;

        let url = Url::parse(&self.downstream_url)
            .with_context(|| format!("invalid downstream url '{}'", self.downstream_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!(
                "downstream url must be http or https, got '{}'",
                url.scheme()
            );
        }

        if self.max_body_bytes == 0 {
            bail!("max_body_bytes must be greater than zero");
        }
        Ok(())
    }

    fn apply_file(&mut self, file_cfg: FileSettings) {
        if let Some(v) = file_cfg.bind_addr {
            self.bind_addr = v;
        }
        if let Some(v) = file_cfg.downstream_url {
            self.downstream_url = v;
        }
        if let Some(v) = file_cfg.max_body_bytes {
            self.max_body_bytes = v;
        }
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("RELAY_BIND") {
            self.bind_addr = v;
        }
        if let Some(v) = var("APP__BIND_ADDR") {
            self.bind_addr = v;
        }

        if let Some(v) = var("DOWNSTREAM_URL") {
            self.downstream_url = v;
        }
        if let Some(v) = var("APP__DOWNSTREAM_URL") {
            self.downstream_url = v;
        }

        if let Some(v) = var("APP__MAX_BODY_BYTES") {
            if let Ok(parsed) = v.parse::<usize>() {
                self.max_body_bytes = parsed;
            }
        }
    }
}

/// Defaults, then `relay.toml` in the working directory, then environment overrides.
pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

fn load_settings_from(
    path: &Path,
    var: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse '{}'", path.display()))?;
        settings.apply_file(file_cfg);
    }

    settings.apply_env(var);
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
