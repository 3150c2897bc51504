//! Explicit tool registry

use std::collections::BTreeMap;

use log::debug;

use crate::errors::{RetileError, RetileResult};

use super::tiling::TilingTool;
use super::tool_traits::Tool;

/// Constructor stored in the registry
pub type ToolFactory = fn() -> Box<dyn Tool>;

/// Table of available tools, keyed by name
pub struct ToolRegistry {
    factories: BTreeMap<&'static str, ToolFactory>,
}

impl ToolRegistry {
    /// An empty registry
    pub fn new() -> Self {
        ToolRegistry {
            factories: BTreeMap::new(),
        }
    }

    /// A registry holding every tool shipped with the crate
    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        registry.factories.insert(TilingTool::NAME, create_tiling_tool);
        registry
    }

    /// Register a tool under `name`
    ///
    /// # Returns
    /// An error if the name is already taken
    pub fn register(&mut self, name: &'static str, factory: ToolFactory) -> RetileResult<()> {
        if self.factories.contains_key(name) {
            return Err(RetileError::Registry(format!("tool '{}' is already registered", name)));
        }
        debug!("Registered tool '{}'", name);
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Instantiate the tool registered under `name`
    pub fn create(&self, name: &str) -> RetileResult<Box<dyn Tool>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| RetileError::ToolNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn list(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn create_tiling_tool() -> Box<dyn Tool> {
    Box::new(TilingTool::new())
}
