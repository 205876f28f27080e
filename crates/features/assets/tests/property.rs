use proptest::prelude::*;
use vhub_assets::{StylesheetConfig, ThemeConfig, ThemeTokens};

fn theme_tokens() -> impl Strategy<Value = ThemeTokens> {
    proptest::collection::btree_map(
        "[a-z]{1,12}",
        proptest::collection::btree_map("[a-z]{1,12}", "#[0-9A-F]{6}", 0..6),
        0..4,
    )
}

proptest! {
    #[test]
    fn roundtrip_arbitrary_records(
        content in proptest::collection::vec("[a-z0-9_./*-]{1,24}", 0..8),
        extend in theme_tokens(),
        plugins in proptest::collection::vec("[a-z-]{1,16}", 0..4),
    ) {
        let record = StylesheetConfig { content, theme: ThemeConfig { extend }, plugins };

        let json = record.to_json().unwrap();
        let reloaded = StylesheetConfig::from_json(&json).unwrap();

        prop_assert_eq!(record, reloaded);
    }

    #[test]
    fn merge_is_additive_and_extension_wins(
        base in theme_tokens(),
        extend in theme_tokens(),
    ) {
        let record = StylesheetConfig {
            content: vec![],
            theme: ThemeConfig { extend: extend.clone() },
            plugins: vec![],
        };

        let merged = record.merged_theme(&base);

        // Every extension token is present with the extension value.
        for (category, tokens) in &extend {
            for (name, value) in tokens {
                prop_assert_eq!(&merged[category][name], value);
            }
        }

        // Base tokens survive unless the extension collided on the same token.
        for (category, tokens) in &base {
            for (name, value) in tokens {
                let overridden =
                    extend.get(category).is_some_and(|ext| ext.contains_key(name));
                if !overridden {
                    prop_assert_eq!(&merged[category][name], value);
                }
            }
        }
    }
}
