//! # Plugins Command Implementation
//!
//! This module implements the `plugins` subcommand, which lists the build
//! plugins of a descriptor with group ids and versions resolved through
//! plugin management and the plugin defaults. With `--implied` it also lists
//! the dependencies each plugin implies.

use anyhow::Result;
use clap::Args;

use pom_view::pom::{PluginView, PomView};

use super::{load_view, or_unknown, TargetArgs};

/// List build plugins with their resolved group ids and versions
#[derive(Args, Debug)]
pub struct PluginsArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Also list the dependencies each plugin implies
    #[arg(long)]
    pub implied: bool,
}

/// Renders the listing `plugins` prints.
pub fn render(view: &PomView, implied: bool) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for mut plugin in view.build_plugins()? {
        lines.push(plugin_line(&plugin)?);

        for dependency in plugin.local_dependencies()? {
            lines.push(format!(
                "  {}:{}:{} [{}]",
                or_unknown(dependency.group_id()?),
                or_unknown(dependency.artifact_id()?),
                or_unknown(dependency.version()?),
                dependency.scope()
            ));
        }

        if implied {
            for dependency in plugin.implied_dependencies()? {
                lines.push(format!(
                    "  + {}:{}:{} [{}]",
                    or_unknown(dependency.group_id()?),
                    or_unknown(dependency.artifact_id()?),
                    or_unknown(dependency.version()?),
                    dependency.scope()
                ));
            }
        }
    }
    Ok(lines)
}

fn plugin_line(plugin: &PluginView<'_>) -> Result<String> {
    let mut line = format!(
        "{}:{}:{}",
        plugin.group_id()?,
        or_unknown(plugin.artifact_id()?),
        or_unknown(plugin.version()?)
    );
    if let Some(profile) = plugin.profile_id()? {
        line.push_str(&format!(" (profile {})", profile));
    }
    Ok(line)
}

/// Execute the `plugins` command.
pub fn execute(args: PluginsArgs) -> Result<()> {
    let view = load_view(&args.target)?;
    for line in render(&view, args.implied)? {
        println!("{}", line);
    }
    Ok(())
}
