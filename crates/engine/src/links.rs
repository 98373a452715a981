//! Hyperlink-aware text transforms over HTML-bearing cell values.
//!
//! These operate syntactically on attribute text, on purpose. A full HTML
//! parse could reorder or normalize attributes and break the "leave
//! everything else untouched" contract, so detection and replacement stay
//! a constrained text scan. All functions are pure; there is no state.

use std::sync::OnceLock;

use regex::Regex;

/// Open anchor tag carrying an href attribute, any attribute order,
/// any casing. Used for row-level link membership.
fn link_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)<a\s+[^>]*href="#).unwrap())
}

/// Full open anchor tag with a capturable href value. Group 1/2/3 are the
/// double-quoted, single-quoted, and unquoted value alternatives.
fn href_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<a\s+[^>]*?href=(?:"([^"]*)"|'([^']*)'|([^\s>]*))[^>]*>"#).unwrap()
    })
}

/// A single anchor occurrence within a cell value.
///
/// Offsets are byte positions into the scanned value; matches are yielded
/// in ascending offset order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch<'a> {
    /// The matched open tag, as written.
    pub full: &'a str,
    /// The href attribute value, as written (entities not unescaped).
    pub href: &'a str,
    /// Byte offset of the open tag's `<`.
    pub start: usize,
    /// Byte offset one past the open tag's `>`.
    pub end: usize,
    /// Byte span of the href value itself, for in-place replacement.
    href_span: (usize, usize),
}

/// Lazy iterator over the anchors in a cell value, in document order.
/// Restart by calling [`extract_links`] again.
pub struct LinkMatches<'a> {
    iter: regex::CaptureMatches<'static, 'a>,
}

impl<'a> Iterator for LinkMatches<'a> {
    type Item = LinkMatch<'a>;

    fn next(&mut self) -> Option<LinkMatch<'a>> {
        let caps = self.iter.next()?;
        let full = caps.get(0).expect("group 0 always present");
        // Exactly one of the three value alternatives participates.
        let value = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .expect("href value group");
        Some(LinkMatch {
            full: full.as_str(),
            href: value.as_str(),
            start: full.start(),
            end: full.end(),
            href_span: (value.start(), value.end()),
        })
    }
}

/// True iff `value` contains at least one open anchor tag with an href
/// attribute. Deliberately looser than [`extract_links`]: the tag does not
/// need to be closed or well formed.
pub fn contains_link(value: &str) -> bool {
    link_pattern().is_match(value)
}

/// All anchors in `value`, left to right.
pub fn extract_links(value: &str) -> LinkMatches<'_> {
    LinkMatches {
        iter: href_pattern().captures_iter(value),
    }
}

/// Replace the href value of the `ordinal`-th anchor (0-based, in
/// [`extract_links`] order), preserving quote style, all other attributes,
/// surrounding text, and tag casing.
///
/// An out-of-range `ordinal` returns `value` unchanged: the caller may be
/// racing an index rebuild against an intervening edit, and a stale ordinal
/// must not corrupt the cell.
pub fn replace_href(value: &str, ordinal: usize, new_href: &str) -> String {
    match extract_links(value).nth(ordinal) {
        Some(link) => {
            let (vs, ve) = link.href_span;
            let mut out = String::with_capacity(value.len() + new_href.len());
            out.push_str(&value[..vs]);
            out.push_str(new_href);
            out.push_str(&value[ve..]);
            out
        }
        None => value.to_string(),
    }
}
