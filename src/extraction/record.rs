//! The extracted listing record

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::attributes::Attributes;
use super::heading::PostingTitle;
use super::media::MapInfo;

/// Normalized listing, one per input document.
///
/// Field names are the interchange names; every field is always serialized,
/// optional ones as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// The input markup, verbatim
    pub raw: String,
    /// All text of the document
    pub text: String,
    /// Document `<title>` text
    pub title: String,
    /// Posting timestamp attribute, verbatim
    pub post_date: String,
    /// Plain listing title, without price or location
    pub titletextonly: Option<String>,
    /// Price label as rendered
    pub price_text: Option<String>,
    /// Price amount, when the label is a plain digit amount
    pub price: Option<f64>,
    /// Photo links in page order
    pub thumb_links: Vec<String>,
    /// Map box, absent when the page has none
    pub map: Option<MapInfo>,
    /// Flattened listing attributes
    pub attributes: Attributes,
    /// Text of the posting body
    pub post_text: String,
    /// Notice lines under the posting
    pub notices: Vec<String>,
    /// Source location, attached by the caller after extraction
    pub url: Option<String>,
}

/// Fields gathered by the individual extractors, before assembly.
#[derive(Debug)]
pub(crate) struct RecordParts {
    pub text: String,
    pub title: String,
    pub post_date: String,
    pub posting_title: PostingTitle,
    pub thumb_links: Vec<String>,
    pub map: Option<MapInfo>,
    pub attributes: Attributes,
    pub post_text: String,
    pub notices: Vec<String>,
}

impl ListingRecord {
    /// Merge extractor output with the raw input. `url` stays unset.
    pub(crate) fn assemble(raw: &str, parts: RecordParts) -> Self {
        let PostingTitle {
            titletextonly,
            price_text,
            price,
        } = parts.posting_title;

        Self {
            raw: raw.to_string(),
            text: parts.text,
            title: parts.title,
            post_date: parts.post_date,
            titletextonly,
            price_text,
            price,
            thumb_links: parts.thumb_links,
            map: parts.map,
            attributes: parts.attributes,
            post_text: parts.post_text,
            notices: parts.notices,
            url: None,
        }
    }

    /// Attach the source URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// `post_date` as a timestamp. Accepts RFC 3339 and the colon-less
    /// offset form listing pages use (`2017-09-26T14:53:47-0700`).
    pub fn posted_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.post_date)
            .or_else(|_| DateTime::parse_from_str(&self.post_date, "%Y-%m-%dT%H:%M:%S%z"))
            .ok()
    }

    /// JSON object without the bulky `raw` and `text` fields, for logs and
    /// CLI previews.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "title": self.title,
            "post_date": self.post_date,
            "titletextonly": self.titletextonly,
            "price": self.price,
            "thumbs": self.thumb_links.len(),
            "attributes": self.attributes.len(),
            "has_map": self.map.is_some(),
            "url": self.url,
        })
    }
}
