//! Strategy registry
//!
//! An application can run several authentication strategies side by side. Each
//! strategy has a unique name, and the surrounding framework selects one by
//! that name.
//!
//! See [`Strategy`] for the trait every strategy implements and
//! [`StrategyRegistry`] for the name-keyed collection.
use std::sync::Arc;

use dashmap::DashMap;
use downcast_rs::{DowncastSync, impl_downcast};

pub trait Strategy: DowncastSync {
    /// The unique name of the strategy instance.
    fn name(&self) -> String;
}
impl_downcast!(sync Strategy);

/// Holds strategies by name.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: DashMap<String, Arc<dyn Strategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a strategy under its own name, replacing any strategy with the same name.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use sesame_core::{Strategy, StrategyRegistry};
    ///
    /// struct Noop;
    /// impl Strategy for Noop {
    ///     fn name(&self) -> String {
    ///         "noop".to_string()
    ///     }
    /// }
    ///
    /// let registry = StrategyRegistry::new();
    /// registry.register(Arc::new(Noop));
    /// assert!(registry.get::<Noop>("noop").is_some());
    /// ```
    pub fn register<T: Strategy>(&self, strategy: Arc<T>) {
        let name = strategy.name();
        if self.strategies.insert(name.clone(), strategy).is_some() {
            tracing::warn!(strategy.name = %name, "Replaced existing strategy");
        } else {
            tracing::info!(strategy.name = %name, "Registered strategy");
        }
    }

    /// Gets a strategy by name, if it is registered with the given concrete type.
    pub fn get<T: Strategy>(&self, name: &str) -> Option<Arc<T>> {
        let strategy = self.strategies.get(name)?;
        strategy.value().clone().downcast_arc::<T>().ok()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    pub fn remove(&self, name: &str) -> bool {
        self.strategies.remove(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.strategies.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}
