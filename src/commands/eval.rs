//! # Eval Command Implementation
//!
//! This module implements the `eval` subcommand, which interpolates
//! expressions against a view. Bare names such as `project.version` are
//! wrapped as `${project.version}`; text that already contains expressions is
//! interpolated as given. Text that cannot be fully resolved is printed
//! unchanged.

use anyhow::Result;
use clap::Args;

use pom_view::pom::PomView;

use super::{load_view, TargetArgs};

/// Interpolate expressions against the view
#[derive(Args, Debug)]
pub struct EvalArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Expressions or text to interpolate
    #[arg(value_name = "EXPR", required = true)]
    pub expressions: Vec<String>,

    /// Active profile whose properties are consulted last. Repeatable.
    #[arg(long = "profile", value_name = "ID")]
    pub profiles: Vec<String>,
}

/// Interpolates one expression argument.
pub fn evaluate(view: &PomView, expression: &str, profiles: &[String]) -> String {
    let text = if view.view().contains_expression(expression) {
        expression.to_string()
    } else {
        format!("${{{}}}", expression)
    };
    view.resolve_expressions(&text, profiles)
}

/// Execute the `eval` command.
pub fn execute(args: EvalArgs) -> Result<()> {
    let view = load_view(&args.target)?;
    for expression in &args.expressions {
        println!("{}", evaluate(&view, expression, &args.profiles));
    }
    Ok(())
}
