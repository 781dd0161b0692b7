use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Process-wide flags shared by the host and every hardware interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Verbose registration tracing.
    pub debug: bool,
    /// Developer mode: objects expose the developer web interface.
    pub developer: bool,
}

pub fn load_config_file(path: impl AsRef<Path>) -> anyhow::Result<GlobalConfig> {
    let path = path.as_ref();
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading config: {}", path.display()))?;
    let cfg: GlobalConfig =
        serde_yaml::from_str(&raw).with_context(|| format!("parsing yaml: {}", path.display()))?;
    Ok(cfg)
}
