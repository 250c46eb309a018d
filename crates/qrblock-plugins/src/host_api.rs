use crate::block::PageContext;
use crate::permissions::{Capability, PermissionSet};
use qrblock_core::CoreConfig;
use std::collections::HashMap;

/// What the block needs from the platform it is embedded in.
pub trait HostApi: Send + Sync {
    fn get_config(&self) -> CoreConfig;

    fn has_capability(&self, capability: Capability, ctx: &PageContext) -> bool;

    fn get_string(&self, identifier: &str) -> String;
}

/// Host with a fixed configuration, permission set and string table.
#[derive(Debug, Clone)]
pub struct StaticHost {
    config: CoreConfig,
    permissions: PermissionSet,
    strings: HashMap<String, String>,
}

impl StaticHost {
    pub fn new(config: CoreConfig, permissions: PermissionSet) -> Self {
        let strings = [
            ("pluginname", "QR code"),
            ("download", "Download"),
            ("qrcode", "QR code linking to this course"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            config,
            permissions,
            strings,
        }
    }

    pub fn with_string(mut self, identifier: &str, value: &str) -> Self {
        self.strings.insert(identifier.to_string(), value.to_string());
        self
    }

    pub fn set_permissions(&mut self, permissions: PermissionSet) {
        self.permissions = permissions;
    }
}

impl HostApi for StaticHost {
    fn get_config(&self) -> CoreConfig {
        self.config.clone()
    }

    fn has_capability(&self, capability: Capability, _ctx: &PageContext) -> bool {
        self.permissions.allows(capability)
    }

    fn get_string(&self, identifier: &str) -> String {
        self.strings
            .get(identifier)
            .cloned()
            .unwrap_or_else(|| format!("[[{identifier}]]"))
    }
}
