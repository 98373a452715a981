// Property-based tests for the link transforms and the derived index.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;

use linkgrid_engine::{links, Document, LinkIndex, Row};

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Plain text between anchors: no tag or quote characters.
fn arb_text() -> impl Strategy<Value = String> {
    r"[ a-zA-Z0-9\.,!]{0,12}"
}

/// An href value safe under every quoting style.
fn arb_href() -> impl Strategy<Value = String> {
    r"[a-z0-9:/\.\-_?=&]{1,24}"
}

/// A cell value with `hrefs.len()` anchors interleaved with plain text,
/// cycling through double-quoted, single-quoted, and unquoted attributes.
fn arb_linked_value() -> impl Strategy<Value = (String, Vec<String>)> {
    (
        prop::collection::vec(arb_href(), 1..5),
        prop::collection::vec(arb_text(), 0..6),
    )
        .prop_map(|(hrefs, texts)| {
            let mut value = String::new();
            for (i, href) in hrefs.iter().enumerate() {
                value.push_str(texts.get(i).map(String::as_str).unwrap_or(""));
                match i % 3 {
                    0 => value.push_str(&format!(r#"<a href="{href}">l{i}</a>"#)),
                    1 => value.push_str(&format!("<a class='c' href='{href}'>l{i}</a>")),
                    _ => value.push_str(&format!("<a href={href} id=x>l{i}</a>")),
                }
            }
            value.push_str(texts.last().map(String::as_str).unwrap_or(""));
            (value, hrefs)
        })
}

fn arb_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        2 => arb_text(),
        1 => arb_linked_value().prop_map(|(value, _)| value),
    ]
}

fn make_row(value: String) -> Row {
    let mut row = Row::new();
    row.insert("Body".to_string(), value);
    row
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    /// Extraction sees every generated anchor, in order.
    #[test]
    fn prop_extract_finds_all_anchors((value, hrefs) in arb_linked_value()) {
        let found: Vec<String> = links::extract_links(&value)
            .map(|l| l.href.to_string())
            .collect();
        prop_assert_eq!(found, hrefs);
    }

    /// Replacing ordinal i changes exactly that href and nothing else.
    #[test]
    fn prop_replace_then_extract_round_trip(
        (value, hrefs) in arb_linked_value(),
        ordinal_seed in 0usize..16,
        new_href in arb_href(),
    ) {
        let ordinal = ordinal_seed % hrefs.len();
        let replaced = links::replace_href(&value, ordinal, &new_href);
        let found: Vec<String> = links::extract_links(&replaced)
            .map(|l| l.href.to_string())
            .collect();

        prop_assert_eq!(found.len(), hrefs.len());
        for (i, href) in found.iter().enumerate() {
            if i == ordinal {
                prop_assert_eq!(href, &new_href);
            } else {
                prop_assert_eq!(href, &hrefs[i]);
            }
        }
    }

    /// Out-of-range ordinals leave the value byte-for-byte unchanged.
    #[test]
    fn prop_replace_out_of_range_is_identity(
        (value, hrefs) in arb_linked_value(),
        extra in 0usize..8,
        new_href in arb_href(),
    ) {
        let replaced = links::replace_href(&value, hrefs.len() + extra, &new_href);
        prop_assert_eq!(replaced, value);
    }

    /// The index is strictly ascending and agrees with contains_link
    /// row by row.
    #[test]
    fn prop_index_matches_membership(values in prop::collection::vec(arb_cell(), 0..40)) {
        let rows: Vec<Row> = values.iter().cloned().map(make_row).collect();
        let index = LinkIndex::build(&rows, &["Body".to_string()]);

        prop_assert!(index.positions().windows(2).all(|w| w[0] < w[1]));
        for (position, value) in values.iter().enumerate() {
            prop_assert_eq!(
                index.positions().contains(&position),
                links::contains_link(value),
                "row {} disagrees for value {:?}", position, value
            );
        }
    }

    /// Writing the stored value back is always a clean no-op.
    #[test]
    fn prop_noop_writes_never_dirty(values in prop::collection::vec(arb_cell(), 1..20)) {
        let rows: Vec<Row> = values.iter().cloned().map(make_row).collect();
        let mut document =
            Document::from_parts(vec!["Body".to_string()], rows, "prop.csv").unwrap();

        for (position, value) in values.iter().enumerate() {
            document.update_cell(position, "Body", value).unwrap();
        }
        prop_assert_eq!(document.dirty_count(), 0);
        prop_assert!(document.changes().is_empty());
    }
}
