//! Tools and their registry
//!
//! A tool is a named operation over a [`TilingConfig`] that reports its
//! outcome as a [`ToolResult`]. Tools are registered explicitly in a
//! [`ToolRegistry`] owned by the caller.

pub mod tool_traits;
pub mod tiling;
pub mod registry;
#[cfg(test)]
mod tests;

pub use tool_traits::Tool;
pub use tiling::TilingTool;
pub use registry::{ToolFactory, ToolRegistry};
