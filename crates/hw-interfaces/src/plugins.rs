use crate::{ValuePlugin, ValueRecord, DEFAULT_PLUGIN};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Pass-through plugin registered under [`DEFAULT_PLUGIN`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl ValuePlugin for PassThrough {
    fn name(&self) -> &str {
        DEFAULT_PLUGIN
    }

    fn convert(&self, value: &serde_json::Value, _mode: &str) -> serde_json::Value {
        value.clone()
    }
}

/// Named conversion plugins available to the host's notification handler.
#[derive(Clone)]
pub struct PluginModules {
    plugins: BTreeMap<String, Arc<dyn ValuePlugin>>,
}

impl PluginModules {
    pub fn new() -> Self {
        let mut plugins: BTreeMap<String, Arc<dyn ValuePlugin>> = BTreeMap::new();
        plugins.insert(DEFAULT_PLUGIN.to_string(), Arc::new(PassThrough));
        Self { plugins }
    }

    /// Register a plugin under its own name, replacing any previous one.
    pub fn register(&mut self, plugin: Arc<dyn ValuePlugin>) {
        self.plugins.insert(plugin.name().to_string(), plugin);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ValuePlugin>> {
        self.plugins.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    /// Convert a record's value with its plugin, falling back to pass-through
    /// when the plugin is unknown.
    pub fn render(&self, record: &ValueRecord) -> serde_json::Value {
        match self.get(&record.plugin) {
            Some(p) => p.convert(&record.value, &record.mode),
            None => {
                tracing::debug!(plugin = %record.plugin, "unknown plugin, passing value through");
                record.value.clone()
            }
        }
    }
}

impl Default for PluginModules {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PluginModules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginModules")
            .field("plugins", &self.names())
            .finish()
    }
}
