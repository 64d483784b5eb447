use husky::services::properties_parser::parse;
use husky::{ConfigSourceLoader, FileDescriptor, PropertiesSourceLoader};
use proptest::prelude::*;
use std::collections::HashMap;

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_.]{0,12}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _./-]{0,20}".prop_map(|v| v.trim().to_string())
}

proptest! {
    /// Property: every written key is read back with its last value
    #[test]
    fn prop_last_assignment_wins(
        pairs in prop::collection::vec((key_strategy(), value_strategy()), 1..20)
    ) {
        let text: String = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}\n"))
            .collect();

        let mut expected: HashMap<&str, &str> = HashMap::new();
        for (k, v) in &pairs {
            expected.insert(k, v);
        }

        let sources = PropertiesSourceLoader::husky()
            .load("prop", FileDescriptor::from_bytes("prop.husky", text))
            .unwrap();

        prop_assert_eq!(sources.len(), 1);
        let source = &sources[0];
        prop_assert_eq!(source.len(), expected.len());
        for (k, v) in expected {
            prop_assert_eq!(source.get(k), Some(v));
        }
    }

    /// Property: parsing never panics and reports plausible positions
    #[test]
    fn prop_arbitrary_text_parses(text in "[\\PC\n\r]{0,200}") {
        let line_count = text.split(['\n', '\r']).count();
        for property in parse(&text) {
            prop_assert!(property.line >= 1);
            prop_assert!(property.line <= line_count);
            prop_assert!(property.column >= 1);
        }
    }

    /// Property: comment lines never produce properties
    #[test]
    fn prop_comments_are_ignored(
        comments in prop::collection::vec("[#!][^\\n\\r\\\\]{0,30}", 0..10)
    ) {
        let text = comments.join("\n");
        prop_assert!(parse(&text).is_empty());
    }
}
