//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use hitcounter_core::error::{HitCounterError, Result};

pub use schema::{
    DashboardSection, DownstreamKind, DownstreamSection, GatewayConfig, GatewaySection, StoreKind,
    StoreSection,
};

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| HitCounterError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| HitCounterError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
