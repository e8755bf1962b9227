//! Attribute group parsing
//!
//! Listings render their structured attributes as `p.attrgroup` blocks, each
//! holding one `<span>` per attribute:
//!
//! ```text
//! <p class="attrgroup">
//!     <span><b>2005 honda cbr600rr</b></span>
//! </p>
//! <p class="attrgroup">
//!     <span>condition: <b>like new</b></span><br>
//!     <span>odometer: <b>21000</b></span>
//! </p>
//! ```
//!
//! The span's own text is the key and its `<b>` child the value. Spans with
//! no key text (usually the leading make/model line) are stored under
//! [`UNNAMED_KEY`].

use std::collections::BTreeMap;

use scraper::ElementRef;
use tracing::trace;

use super::navigator::{AttrFilter, Navigate};

/// Key used for an attribute that carries no key text of its own.
pub const UNNAMED_KEY: &str = "_name";

/// Flattened attribute mapping. Keys are unique; later duplicates win.
pub type Attributes = BTreeMap<String, String>;

/// Flatten every attribute leaf across `groups` into one mapping.
///
/// Leaves are visited in document order across all groups, so when two
/// leaves share a key the later one overwrites the earlier.
pub fn parse_attribute_groups(groups: &[ElementRef<'_>]) -> Attributes {
    let mut attributes = Attributes::new();

    for leaf in groups
        .iter()
        .flat_map(|group| group.find_children("span", AttrFilter::Any))
    {
        let (key, value) = parse_leaf(leaf);
        trace!(%key, %value, "attribute");
        attributes.insert(key, value);
    }

    attributes
}

/// Key and value of a single attribute leaf.
pub fn parse_leaf(leaf: ElementRef<'_>) -> (String, String) {
    let key = leaf.own_text().unwrap_or(UNNAMED_KEY);
    let key = normalize_key(key).to_string();

    let value = match leaf.find("b", AttrFilter::Any) {
        Some(bold) => bold.rendered_text(),
        None => leaf.rendered_text(),
    };

    (key, value)
}

/// Drop trailing whitespace and colons: `"condition: "` → `"condition"`.
pub fn normalize_key(key: &str) -> &str {
    key.trim_end_matches(|c: char| c.is_whitespace() || c == ':')
}
