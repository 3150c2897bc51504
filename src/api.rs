use log::info;

use crate::config::TilingConfig;
use crate::errors::RetileResult;
use crate::extractor::{NoProgress, ProgressSink, TilePlan};
use crate::result::ToolResult;
use crate::tools::{TilingTool, Tool, ToolRegistry};
use crate::utils::image_utils;

/// Main interface to the retile library
pub struct Retile {
    registry: ToolRegistry,
}

impl Retile {
    /// Create a new Retile instance with the built-in tools
    pub fn new() -> Self {
        Retile {
            registry: ToolRegistry::with_builtin_tools(),
        }
    }

    /// Create a Retile instance over a custom registry
    ///
    /// # Arguments
    /// * `registry` - Tools available to [`run_tool`](Self::run_tool)
    pub fn with_registry(registry: ToolRegistry) -> Self {
        Retile { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Extract tiles
    ///
    /// Validates the configuration, decodes the input with its EXIF
    /// orientation applied, then runs the extraction pipeline.
    ///
    /// # Arguments
    /// * `config` - Run configuration
    ///
    /// # Returns
    /// The run report; failures are reported in it, never as a panic
    pub fn tile(&self, config: &TilingConfig) -> ToolResult {
        self.tile_with_progress(config, &NoProgress)
    }

    /// Extract tiles, reporting per-tile progress to `progress`
    pub fn tile_with_progress(&self, config: &TilingConfig, progress: &dyn ProgressSink) -> ToolResult {
        TilingTool::new().execute_with_progress(config, progress)
    }

    /// Preview a run without decoding pixels
    ///
    /// # Arguments
    /// * `config` - Run configuration
    ///
    /// # Returns
    /// The plan, or an error if the input cannot be probed or the output
    /// pattern is malformed
    pub fn plan(&self, config: &TilingConfig) -> RetileResult<TilePlan> {
        let (width, height) = image_utils::probe_dimensions(&config.input_path)?;
        info!("Planning {} tiles on {}x{} image", config.coordinates.len(), width, height);
        TilePlan::build(config, width, height)
    }

    /// Run a registered tool by name
    ///
    /// # Returns
    /// The tool's report, or `ToolNotFound` for unknown names
    pub fn run_tool(&self, name: &str, config: &TilingConfig) -> RetileResult<ToolResult> {
        let tool = self.registry.create(name)?;
        info!("Running tool '{}' v{}", tool.name(), tool.version());
        Ok(tool.execute(config))
    }
}

impl Default for Retile {
    fn default() -> Self {
        Self::new()
    }
}
