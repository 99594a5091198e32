//! Component Registry

use crate::paramset::*;
use std::collections::BTreeMap;

/// Factory function creating a component from its parameters.
pub type Factory<T> = fn(&ParamSet) -> Result<Box<T>, String>;

/// Maps component names (e.g. `accel::bvh`) to factories. Each crate fills a
/// registry with its own `register_*` function at startup.
pub struct Registry<T: ?Sized> {
    factories: BTreeMap<String, Factory<T>>,
}

impl<T: ?Sized> Default for Registry<T> {
    /// Returns an empty registry.
    fn default() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }
}

impl<T: ?Sized> Registry<T> {
    /// Returns an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory. Registering a name twice replaces the old factory.
    ///
    /// * `name`    - Component name.
    /// * `factory` - Factory function.
    pub fn register(&mut self, name: &str, factory: Factory<T>) {
        if self.factories.insert(name.to_string(), factory).is_some() {
            warn!("Component '{}' registered twice; replacing.", name);
        }
    }

    /// Returns true if a factory is registered under the name.
    ///
    /// * `name` - Component name.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(|k| k.as_str()).collect()
    }

    /// Create a component by name.
    ///
    /// * `name`   - Component name.
    /// * `params` - Parameters passed to the factory.
    pub fn create(&self, name: &str, params: &ParamSet) -> Result<Box<T>, String> {
        let factory = self.factories.get(name).ok_or_else(|| {
            format!(
                "Unknown component '{}'. Available: {}",
                name,
                self.names().join(", ")
            )
        })?;
        debug!("Creating component '{}'", name);
        factory(params).map_err(|e| format!("Failed to create '{}'. {}", name, e))
    }
}
