//! Views spliced into another view's results for selected paths.

use std::fmt;
use std::sync::Arc;

use super::XmlView;

/// Which query paths a mixin takes part in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MixinScope {
    /// Every path.
    All,
    /// Paths that address dependency management; used for imported BOMs.
    DependencyManagement,
    /// Paths containing any of the given fragments.
    Prefixes(Vec<String>),
}

impl MixinScope {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            MixinScope::All => true,
            MixinScope::DependencyManagement => path.contains("dependencyManagement"),
            MixinScope::Prefixes(fragments) => fragments.iter().any(|fragment| path.contains(fragment.as_str())),
        }
    }
}

impl fmt::Display for MixinScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MixinScope::All => write!(f, "all paths"),
            MixinScope::DependencyManagement => write!(f, "dependency management"),
            MixinScope::Prefixes(fragments) => write!(f, "paths containing {}", fragments.join(", ")),
        }
    }
}

/// A view attached to another view, consulted after its own stack.
#[derive(Debug, Clone)]
pub struct Mixin {
    scope: MixinScope,
    view: Arc<XmlView>,
}

impl Mixin {
    pub fn new(scope: MixinScope, view: Arc<XmlView>) -> Self {
        Self { scope, view }
    }

    pub fn scope(&self) -> &MixinScope {
        &self.scope
    }

    pub fn view(&self) -> &Arc<XmlView> {
        &self.view
    }

    pub fn matches(&self, path: &str) -> bool {
        self.scope.matches(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_matching() {
        assert!(MixinScope::All.matches("/project/version"));

        let management = MixinScope::DependencyManagement;
        assert!(management.matches("/project/dependencyManagement/dependencies/dependency[groupId/text()=\"a\"]"));
        assert!(!management.matches("/project/dependencies/dependency"));

        let prefixes = MixinScope::Prefixes(vec!["/project/build".to_string()]);
        assert!(prefixes.matches("/project/build/plugins/plugin"));
        assert!(!prefixes.matches("/project/dependencies"));
    }
}
