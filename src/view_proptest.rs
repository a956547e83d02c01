//! Property-based tests for multi-document views.
//!
//! These tests use proptest to generate descriptor contents and check that
//! inheritance and interpolation behave the same for every input.

#[cfg(test)]
mod proptest_tests {
    use std::sync::Arc;

    use proptest::prelude::*;

    use crate::doc::DocumentHandle;
    use crate::model::{Coordinate, Location};
    use crate::pom::LOCAL_ONLY_PATHS;
    use crate::view::{Depth, XmlView};
    use crate::xml::parse;

    fn handle(artifact: &str, xml: &str) -> Arc<DocumentHandle> {
        Arc::new(DocumentHandle::new(
            Coordinate::new("org.test", artifact, "1"),
            Location::new("file:///repo/").unwrap(),
            parse(artifact, xml.as_bytes()).unwrap(),
        ))
    }

    fn depth_strategy() -> impl Strategy<Value = Depth> {
        prop_oneof![Just(Depth::Unlimited), (0usize..6).prop_map(Depth::Limited)]
    }

    proptest! {
        /// Property: text without expressions comes back unchanged
        #[test]
        fn plain_text_is_not_interpolated(text in "[^$]*") {
            let view = XmlView::new(vec![handle("a", "<project/>")], &[]);
            prop_assert_eq!(view.resolve_expressions(&text, &[]), text);
        }

        /// Property: a property reference resolves to the property value
        #[test]
        fn property_reference_resolves(name in "p[a-z0-9]{0,8}", value in "[A-Za-z0-9.]{1,12}") {
            let xml = format!("<project><properties><{0}>{1}</{0}></properties></project>", name, value);
            let view = XmlView::new(vec![handle("a", &xml)], &[]);
            let resolved = view.resolve_expressions(&format!("v=${{{}}}", name), &[]);
            prop_assert_eq!(resolved, format!("v={}", value));
        }

        /// Property: local-only paths see only the first document, whatever
        /// depth is requested
        #[test]
        fn local_only_paths_ignore_depth(
            own in proptest::option::of("[a-z]{1,8}"),
            inherited in "[a-z]{1,8}",
            depth in depth_strategy(),
        ) {
            let child = match &own {
                Some(artifact) => format!("<project><artifactId>{}</artifactId></project>", artifact),
                None => "<project/>".to_string(),
            };
            let parent = format!("<project><artifactId>{}</artifactId></project>", inherited);
            let view = XmlView::new(vec![handle("child", &child), handle("parent", &parent)], LOCAL_ONLY_PATHS);

            let resolved = view.resolve_value("/project/artifactId", depth).unwrap();
            prop_assert_eq!(resolved, own);
        }

        /// Property: depth zero never consults ancestors, and a limited depth
        /// reaches exactly that many of them
        #[test]
        fn depth_bounds_inheritance(levels in 1usize..5, depth in 0usize..6) {
            let mut stack = vec![handle("d0", "<project/>")];
            for level in 1..=levels {
                let xml = if level == levels {
                    "<project><url>deep</url></project>".to_string()
                } else {
                    "<project/>".to_string()
                };
                stack.push(handle(&format!("d{}", level), &xml));
            }
            let view = XmlView::new(stack, &[]);

            let resolved = view.resolve_value("/project/url", Depth::Limited(depth)).unwrap();
            if depth >= levels {
                prop_assert_eq!(resolved.as_deref(), Some("deep"));
            } else {
                prop_assert_eq!(resolved, None);
            }
        }

        /// Property: aggregation over the full stack returns one match per
        /// document that has one, in stack order
        #[test]
        fn aggregation_keeps_stack_order(flags in proptest::collection::vec(any::<bool>(), 1..6)) {
            let stack: Vec<_> = flags
                .iter()
                .enumerate()
                .map(|(index, present)| {
                    let xml = if *present {
                        format!("<project><name>n{}</name></project>", index)
                    } else {
                        "<project/>".to_string()
                    };
                    handle(&format!("d{}", index), &xml)
                })
                .collect();
            let view = XmlView::new(stack, &[]);

            let expected: Vec<String> = flags
                .iter()
                .enumerate()
                .filter(|(_, present)| **present)
                .map(|(index, _)| format!("n{}", index))
                .collect();
            prop_assert_eq!(view.resolve_values("/project/name", Depth::Unlimited).unwrap(), expected);
        }
    }
}
