use serde::Deserialize;
use hitcounter_core::error::{HitCounterError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    pub downstream: DownstreamSection,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub dashboard: DashboardSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(HitCounterError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.downstream.validate()?;
        self.store.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(HitCounterError::BadRequest(
                "gateway.listen must be a valid SocketAddr".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

/// How the downstream target identifier is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DownstreamKind {
    /// In-process handler registered by name.
    #[default]
    Local,
    /// Remote handler reached by POSTing to a URL.
    Http,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownstreamSection {
    pub target: String,

    #[serde(default)]
    pub kind: DownstreamKind,

    #[serde(default = "default_forward_timeout_ms")]
    pub timeout_ms: u64,
}

impl DownstreamSection {
    pub fn validate(&self) -> Result<()> {
        if self.target.trim().is_empty() {
            return Err(HitCounterError::BadRequest(
                "downstream.target must not be empty".into(),
            ));
        }
        if self.kind == DownstreamKind::Http
            && !(self.target.starts_with("http://") || self.target.starts_with("https://"))
        {
            return Err(HitCounterError::BadRequest(
                "downstream.target must be an http(s) URL when kind is http".into(),
            ));
        }
        if !(100..=60000).contains(&self.timeout_ms) {
            return Err(HitCounterError::BadRequest(
                "downstream.timeout_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_forward_timeout_ms() -> u64 {
    3000
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default)]
    pub kind: StoreKind,

    #[serde(default)]
    pub path: Option<String>,

    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            path: None,
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl StoreSection {
    pub fn validate(&self) -> Result<()> {
        if self.kind == StoreKind::File
            && self.path.as_deref().map_or(true, |p| p.trim().is_empty())
        {
            return Err(HitCounterError::BadRequest(
                "store.path is required when kind is file".into(),
            ));
        }
        if !(10..=30000).contains(&self.lock_timeout_ms) {
            return Err(HitCounterError::BadRequest(
                "store.lock_timeout_ms must be between 10 and 30000".into(),
            ));
        }
        Ok(())
    }
}

fn default_lock_timeout_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardSection {
    #[serde(default = "default_dashboard_title")]
    pub title: String,
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            title: default_dashboard_title(),
        }
    }
}

fn default_dashboard_title() -> String {
    "Hello Hits".into()
}
