//! # Show Command Implementation
//!
//! This module implements the `show` subcommand, which prints the documents a
//! view is built from: the descriptor and its ancestors in stack order, and
//! the imported BOMs (with their own ancestry) as nested mixins.
//!
//! This command is a safe, read-only operation.

use anyhow::Result;
use clap::Args;
use ptree::{print_tree, TreeItem};

use pom_view::view::XmlView;

use super::{load_view, TargetArgs};

/// Show the documents and BOM imports a view is built from
#[derive(Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Execute the `show` command.
pub fn execute(args: ShowArgs) -> Result<()> {
    let view = load_view(&args.target)?;
    let tree = build_tree_node(view.reference().to_string(), view.view());
    print_tree(&tree).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;
    Ok(())
}

/// Build a tree node for a view: one child per stack entry, then one per mixin
fn build_tree_node(label: String, view: &XmlView) -> TreeNode {
    let mut children: Vec<TreeNode> = view
        .stack()
        .iter()
        .enumerate()
        .map(|(index, handle)| TreeNode::leaf(format!("[{}] {}", index, handle)))
        .collect();

    for mixin in view.mixins() {
        let mixin_view = mixin.view();
        let name = mixin_view
            .head()
            .map(|head| head.coordinate().to_string())
            .unwrap_or_default();
        children.push(build_tree_node(
            format!("mixin {} ({})", name, mixin.scope()),
            mixin_view,
        ));
    }

    TreeNode { label, children }
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(label: String) -> Self {
        Self {
            label,
            children: vec![],
        }
    }
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _style: &ptree::Style) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> std::borrow::Cow<'_, [Self::Child]> {
        std::borrow::Cow::Borrowed(&self.children)
    }
}
