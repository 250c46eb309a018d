use crate::encoder::ErrorCorrection;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Upper bound for `qr.module_px`.
pub const MAX_MODULE_PX: u32 = 64;
/// Upper bound for `qr.border`, in modules.
pub const MAX_BORDER: u32 = 64;

/// Host default for newly created data directories (setgid, world writable).
pub const DEFAULT_DIRECTORY_PERMISSIONS: u32 = 0o2777;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CoreConfig {
    pub site: SiteConfig,
    pub cache: CacheConfig,
    pub qr: QrConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    pub wwwroot: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub root_dir: Option<PathBuf>,
    pub directory_permissions: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root_dir: None,
            directory_permissions: DEFAULT_DIRECTORY_PERMISSIONS,
        }
    }
}

impl CacheConfig {
    pub fn require_root(&self) -> CoreResult<&Path> {
        self.root_dir
            .as_deref()
            .ok_or_else(|| CoreError::Config("cache.root_dir is required".to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QrConfig {
    pub error_correction: ErrorCorrection,
    /// Pixels per module.
    pub module_px: u32,
    /// Quiet zone, in modules.
    pub border: u32,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrection::Low,
            module_px: 3,
            border: 4,
        }
    }
}

impl QrConfig {
    pub fn check(&self) -> CoreResult<()> {
        check_qr_geometry(self.module_px, self.border)
    }
}

pub(crate) fn check_qr_geometry(module_px: u32, border: u32) -> CoreResult<()> {
    if module_px == 0 || module_px > MAX_MODULE_PX {
        return Err(CoreError::Config(format!(
            "qr.module_px must be between 1 and {MAX_MODULE_PX}, got {module_px}"
        )));
    }
    if border > MAX_BORDER {
        return Err(CoreError::Config(format!(
            "qr.border must be at most {MAX_BORDER}, got {border}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl CoreConfig {
    pub fn load(path: &Path) -> CoreResult<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> CoreResult<Self> {
        let cfg: CoreConfig = serde_json::from_str(data)?;
        Ok(cfg)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.site.wwwroot.trim().is_empty() {
            return Err(CoreError::Config("site.wwwroot is required".to_string()));
        }
        url::Url::parse(&self.site.wwwroot)?;
        self.cache.require_root()?;
        self.qr.check()
    }
}
