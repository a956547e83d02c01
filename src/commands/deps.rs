//! # Deps Command Implementation
//!
//! This module implements the `deps` subcommand, which lists the direct (or,
//! with `--managed`, the managed) dependencies of a descriptor with their
//! versions and scopes resolved through inheritance, management sections and
//! imported BOMs.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use pom_view::pom::{DependencyView, PomView};

use super::{load_view, or_unknown, TargetArgs};

/// List dependencies with their resolved versions and scopes
#[derive(Args, Debug)]
pub struct DepsArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// List managed dependencies instead of direct ones
    #[arg(long)]
    pub managed: bool,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// One listed dependency
#[derive(Debug, Serialize)]
pub struct DependencyRow {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl DependencyRow {
    fn from_view(dependency: &DependencyView<'_>) -> Result<Self> {
        Ok(Self {
            group_id: dependency.group_id()?,
            artifact_id: dependency.artifact_id()?,
            version: dependency.version()?,
            kind: dependency.kind()?,
            scope: dependency.scope()?.to_string(),
            classifier: dependency.classifier()?,
            optional: dependency.optional()?,
            profile: dependency.profile_id()?,
        })
    }

    fn to_line(&self) -> String {
        let mut line = format!(
            "{}:{}:{}",
            or_unknown(self.group_id.clone()),
            or_unknown(self.artifact_id.clone()),
            or_unknown(self.version.clone())
        );
        if self.kind != "jar" {
            line.push_str(&format!(":{}", self.kind));
        }
        if let Some(classifier) = &self.classifier {
            line.push_str(&format!(":{}", classifier));
        }
        line.push_str(&format!(" [{}]", self.scope));
        if self.optional {
            line.push_str(" optional");
        }
        if let Some(profile) = &self.profile {
            line.push_str(&format!(" (profile {})", profile));
        }
        line
    }
}

/// Collects the rows `deps` prints.
pub fn collect_rows(view: &PomView, managed: bool) -> Result<Vec<DependencyRow>> {
    let dependencies = if managed {
        view.managed_dependencies()?
    } else {
        view.direct_dependencies()?
    };
    dependencies.iter().map(DependencyRow::from_view).collect()
}

/// Execute the `deps` command.
pub fn execute(args: DepsArgs) -> Result<()> {
    let view = load_view(&args.target)?;
    let rows = collect_rows(&view, args.managed)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in &rows {
            println!("{}", row.to_line());
        }
    }
    Ok(())
}
