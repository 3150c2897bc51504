//! Tool interface

use crate::config::TilingConfig;
use crate::errors::ValidationError;
use crate::extractor::ProgressSink;
use crate::result::ToolResult;

/// A named operation over a tiling configuration
///
/// Tools never panic or return errors for run failures; every outcome,
/// including invalid input, is reported through the returned
/// [`ToolResult`].
pub trait Tool {
    /// Registry key
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn version(&self) -> &'static str;

    /// Check a configuration without running
    ///
    /// # Returns
    /// The problems found; empty when the tool can run
    fn validate(&self, config: &TilingConfig) -> Vec<ValidationError>;

    /// Run the tool
    fn execute(&self, config: &TilingConfig) -> ToolResult;

    /// Run the tool, reporting per-tile progress to the sink
    ///
    /// Tools without incremental work ignore the sink.
    fn execute_with_progress(&self, config: &TilingConfig, _progress: &dyn ProgressSink) -> ToolResult {
        self.execute(config)
    }
}
