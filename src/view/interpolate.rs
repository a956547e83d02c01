//! `${...}` expression interpolation.
//!
//! Interpolation is best-effort: [`Interpolator::resolve`] never fails. Any
//! token it cannot resolve makes it hand back the original text untouched,
//! with the reason logged. [`Interpolator::interpolate`] exposes the
//! underlying fallible operation.

use regex::Regex;
use thiserror::Error;

use crate::error::Result;

/// Anything that can answer "what is the value of this expression name".
pub trait ValueSource {
    /// Looks up the raw (not yet interpolated) value for `name`.
    fn lookup(&self, name: &str) -> Result<Option<String>>;
}

/// Why an interpolation attempt was abandoned.
#[derive(Error, Debug)]
pub enum InterpolationError {
    #[error("no value for expression '{name}'")]
    Unresolved { name: String },

    #[error("expression '{name}' refers back to itself")]
    Cycle { name: String },

    #[error("lookup of expression '{name}' failed: {source}")]
    Lookup {
        name: String,
        #[source]
        source: crate::error::Error,
    },
}

/// An interpolation session: compiled token patterns, reusable across calls.
///
/// No resolved values are remembered between calls.
#[derive(Debug)]
pub struct Interpolator {
    token: Regex,
    detect: Regex,
}

impl Interpolator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            token: Regex::new(r"\$\{([^}]+)\}")?,
            detect: Regex::new(r"\$\{.+\}")?,
        })
    }

    /// Whether `text` contains anything that looks like an expression,
    /// malformed ones included.
    pub fn contains_expression(&self, text: &str) -> bool {
        self.detect.is_match(text)
    }

    /// Substitutes every token in `text`, failing on the first token that
    /// cannot be resolved.
    pub fn interpolate(&self, text: &str, source: &dyn ValueSource) -> std::result::Result<String, InterpolationError> {
        let mut active = Vec::new();
        self.expand(text, source, &mut active)
    }

    fn expand(
        &self,
        text: &str,
        source: &dyn ValueSource,
        active: &mut Vec<String>,
    ) -> std::result::Result<String, InterpolationError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in self.token.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let name = name.as_str().trim();
            out.push_str(&text[last..whole.start()]);

            if active.iter().any(|seen| seen == name) {
                return Err(InterpolationError::Cycle {
                    name: name.to_string(),
                });
            }

            let value = source
                .lookup(name)
                .map_err(|source| InterpolationError::Lookup {
                    name: name.to_string(),
                    source,
                })?
                .ok_or_else(|| InterpolationError::Unresolved {
                    name: name.to_string(),
                })?;

            let value = if self.contains_expression(&value) {
                active.push(name.to_string());
                let expanded = self.expand(&value, source, active);
                active.pop();
                expanded?
            } else {
                value
            };

            out.push_str(&value);
            last = whole.end();
        }

        out.push_str(&text[last..]);
        Ok(out)
    }

    /// Best-effort interpolation: the original `text` is returned whenever
    /// substitution fails or yields a blank string.
    pub fn resolve(&self, text: &str, source: &dyn ValueSource) -> String {
        if !self.contains_expression(text) {
            return text.to_string();
        }

        match self.interpolate(text, source) {
            Ok(result) if !result.trim().is_empty() => result,
            Ok(_) => text.to_string(),
            Err(e @ InterpolationError::Lookup { .. }) => {
                log::error!("Failed to resolve expressions in: '{}'. Reason: {}", text, e);
                text.to_string()
            }
            Err(e) => {
                log::debug!("Leaving '{}' uninterpolated: {}", text, e);
                text.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    struct MapSource(HashMap<&'static str, &'static str>);

    impl ValueSource for MapSource {
        fn lookup(&self, name: &str) -> Result<Option<String>> {
            if name == "broken" {
                return Err(Error::QuerySyntax {
                    path: name.to_string(),
                    message: "bad".to_string(),
                });
            }
            Ok(self.0.get(name).map(|value| value.to_string()))
        }
    }

    fn source() -> MapSource {
        MapSource(HashMap::from([
            ("a", "1"),
            ("b", "${a}.2"),
            ("loop", "${loop2}"),
            ("loop2", "${loop}"),
            ("blank", "  "),
        ]))
    }

    #[test]
    fn test_identity_without_tokens() {
        let interpolator = Interpolator::new().unwrap();
        assert_eq!(interpolator.resolve("plain text", &source()), "plain text");
        assert_eq!(interpolator.resolve("$ {a}", &source()), "$ {a}");
    }

    #[test]
    fn test_substitutes_and_recurses() {
        let interpolator = Interpolator::new().unwrap();
        assert_eq!(interpolator.resolve("v${a}", &source()), "v1");
        assert_eq!(interpolator.resolve("${b}-${a}", &source()), "1.2-1");
    }

    #[test]
    fn test_all_or_nothing() {
        let interpolator = Interpolator::new().unwrap();
        assert_eq!(interpolator.resolve("${a}-${missing}", &source()), "${a}-${missing}");
        assert!(matches!(
            interpolator.interpolate("${missing}", &source()),
            Err(InterpolationError::Unresolved { .. })
        ));
    }

    #[test]
    fn test_cycle_returns_original() {
        let interpolator = Interpolator::new().unwrap();
        assert_eq!(interpolator.resolve("${loop}", &source()), "${loop}");
        assert!(matches!(
            interpolator.interpolate("${loop}", &source()),
            Err(InterpolationError::Cycle { .. })
        ));
    }

    #[test]
    fn test_lookup_error_is_recovered_and_logged() {
        testing_logger::setup();
        let interpolator = Interpolator::new().unwrap();
        assert_eq!(interpolator.resolve("${broken}", &source()), "${broken}");

        testing_logger::validate(|logs| {
            assert!(logs
                .iter()
                .any(|entry| entry.level == log::Level::Error && entry.body.contains("${broken}")));
        });
    }

    #[test]
    fn test_blank_result_falls_back() {
        let interpolator = Interpolator::new().unwrap();
        assert_eq!(interpolator.resolve("${blank}", &source()), "${blank}");
    }

    #[test]
    fn test_malformed_token_left_alone() {
        let interpolator = Interpolator::new().unwrap();
        assert!(interpolator.contains_expression("${a${b}}"));
        assert_eq!(interpolator.resolve("${a${b}}", &source()), "${a${b}}");
    }
}
