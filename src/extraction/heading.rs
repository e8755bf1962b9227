//! Title, posting date and price extraction

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::anchors::require;
use super::navigator::{root, AttrFilter, Navigate};
use crate::error::{Anchor, StructuralError};

/// Optional values found in the `h2.postingtitle` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostingTitle {
    /// `span#titletextonly` text
    pub titletextonly: Option<String>,
    /// `span.price` text, verbatim
    pub price_text: Option<String>,
    /// Numeric price, present only for a plain digit amount
    pub price: Option<f64>,
}

/// Text of the document `<title>`.
///
/// # Errors
///
/// [`Anchor::Title`] when the document has no title element.
pub fn document_title(document: &Html) -> Result<String, StructuralError> {
    let title = require(root(document).find("title", AttrFilter::Any), Anchor::Title)?;
    Ok(title.rendered_text())
}

/// Machine-readable posting timestamp, taken verbatim from the `datetime`
/// attribute of the display-date `<time>` in the body header.
///
/// # Errors
///
/// [`Anchor::PostDate`] when any step of header → display date → time is
/// missing.
pub fn post_date(body: ElementRef<'_>) -> Result<String, StructuralError> {
    let datetime = body
        .find("header", AttrFilter::Any)
        .and_then(|header| header.find("p", AttrFilter::Id("display-date")))
        .and_then(|display| display.find("time", AttrFilter::Has("datetime")))
        .and_then(|time| time.value().attr("datetime"));

    require(datetime, Anchor::PostDate).map(str::to_string)
}

/// Plain title and price from the posting title block. Any missing piece
/// leaves its field as `None`.
pub fn posting_title(body: ElementRef<'_>) -> PostingTitle {
    let Some(title_text) = body
        .find("h2", AttrFilter::Class("postingtitle"))
        .and_then(|h2| h2.find("span", AttrFilter::Class("postingtitletext")))
    else {
        debug!("no posting title block");
        return PostingTitle::default();
    };

    let titletextonly = title_text
        .find("span", AttrFilter::Id("titletextonly"))
        .map(|span| span.rendered_text());

    let price_text = title_text
        .find("span", AttrFilter::Class("price"))
        .map(|span| span.rendered_text());
    let price = price_text.as_deref().and_then(parse_price);

    PostingTitle {
        titletextonly,
        price_text,
        price,
    }
}

fn price_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^0-9]?([0-9]+)$").expect("price pattern is valid"))
}

/// Numeric value of a price label.
///
/// One leading currency symbol is dropped; what remains must be ASCII digits
/// only. Separators and decimals (`$1,250`, `$9.99`) yield `None`.
pub fn parse_price(text: &str) -> Option<f64> {
    price_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse::<f64>().ok())
}
