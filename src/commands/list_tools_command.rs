//! Tool listing command

use clap::ArgMatches;
use serde_json::json;

use crate::commands::command_traits::Command;
use crate::errors::RetileResult;
use crate::tools::ToolRegistry;

/// Command for listing registered tools
pub struct ListToolsCommand {
    json: bool,
}

impl ListToolsCommand {
    pub fn new(args: &ArgMatches) -> RetileResult<Self> {
        Ok(ListToolsCommand {
            json: args.get_flag("json"),
        })
    }
}

impl Command for ListToolsCommand {
    fn execute(&self) -> RetileResult<()> {
        let registry = ToolRegistry::with_builtin_tools();
        let mut entries = Vec::with_capacity(registry.len());

        for name in registry.list() {
            let tool = registry.create(name)?;
            if self.json {
                entries.push(json!({
                    "name": tool.name(),
                    "version": tool.version(),
                    "description": tool.description(),
                }));
            } else {
                println!("{} {}  {}", tool.name(), tool.version(), tool.description());
            }
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Ok(())
    }
}
