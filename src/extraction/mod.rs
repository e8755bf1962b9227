//! Listing extraction module
//!
//! Turns a listing page into a [`ListingRecord`]. The work is a straight
//! pipeline over one parsed tree: resolve the required anchors, run each
//! field extractor against its anchor, assemble.
//!
//! ```text
//! raw HTML ──▶ Anchors ──┬──▶ heading     (title, post_date, titletextonly, price)
//!                        ├──▶ media       (thumb_links, map)
//!                        ├──▶ attributes  (attributes)
//!                        └──▶ body        (post_text, notices)
//!                                   │
//!                                   ▼
//!                             ListingRecord
//! ```
//!
//! Extraction is synchronous and holds no state between calls.

pub mod anchors;
pub mod attributes;
pub mod body;
pub mod heading;
pub mod media;
pub mod navigator;
pub mod record;

pub use anchors::Anchors;
pub use attributes::{parse_attribute_groups, Attributes, UNNAMED_KEY};
pub use heading::{parse_price, PostingTitle};
pub use media::MapInfo;
pub use navigator::{AttrFilter, Navigate};
pub use record::ListingRecord;

use scraper::Html;
use tracing::{debug, instrument};

use crate::error::StructuralError;
use navigator::root;
use record::RecordParts;

/// Extraction behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Fail when the photo thumbnail container is missing (default: true).
    /// When unset, a missing container yields an empty `thumb_links`.
    pub require_thumbnails: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            require_thumbnails: true,
        }
    }
}

impl ExtractOptions {
    /// Options that tolerate listings rendered without a photo container.
    pub fn lenient() -> Self {
        Self {
            require_thumbnails: false,
        }
    }
}

/// Listing page extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListingExtractor {
    options: ExtractOptions,
}

impl ListingExtractor {
    /// Extractor with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor with explicit options.
    pub fn with_options(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Options in effect.
    pub fn options(&self) -> ExtractOptions {
        self.options
    }

    /// Extract a record from a listing page.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError`] when a required element is missing. No
    /// partial record is produced.
    #[instrument(skip_all, fields(bytes = raw.len()))]
    pub fn extract(&self, raw: &str) -> Result<ListingRecord, StructuralError> {
        let document = Html::parse_document(raw);
        let anchors = Anchors::resolve(&document)?;

        let title = heading::document_title(&document)?;
        let post_date = heading::post_date(anchors.body)?;
        let posting_title = heading::posting_title(anchors.body);

        let thumb_links = media::thumb_links(anchors.user_body, self.options.require_thumbnails)?;

        let map_and_attrs = anchors
            .user_body
            .find("div", AttrFilter::Class("mapAndAttrs"));
        let map = media::map_info(map_and_attrs);
        let groups = map_and_attrs
            .map(|region| region.find_all("p", AttrFilter::Class("attrgroup")))
            .unwrap_or_default();
        let attributes = parse_attribute_groups(&groups);

        let post_text = body::post_text(anchors.user_body)?;
        let notices = body::notices(anchors.user_body)?;

        debug!(
            title = %title,
            price = ?posting_title.price,
            thumbs = thumb_links.len(),
            attributes = attributes.len(),
            has_map = map.is_some(),
            "listing extracted"
        );

        Ok(ListingRecord::assemble(
            raw,
            RecordParts {
                text: root(&document).rendered_text(),
                title,
                post_date,
                posting_title,
                thumb_links,
                map,
                attributes,
                post_text,
                notices,
            },
        ))
    }
}

/// Extract a record with default options.
///
/// # Errors
///
/// See [`ListingExtractor::extract`].
pub fn extract(raw: &str) -> Result<ListingRecord, StructuralError> {
    ListingExtractor::new().extract(raw)
}
