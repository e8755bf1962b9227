//! Document navigation
//!
//! Typed lookups over a parsed [`scraper::Html`] tree. Every lookup that may
//! legitimately find nothing returns an `Option` or an empty `Vec`; nothing in
//! here panics or errors on absence. Callers decide whether absence is fatal.

use scraper::{ElementRef, Html};

/// Attribute filter applied after the tag name matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrFilter<'f> {
    /// Match on tag name only
    Any,
    /// Element carries this class among its classes
    Class(&'f str),
    /// Element `id` equals this value
    Id(&'f str),
    /// Element has attribute `name`, whatever its value
    Has(&'f str),
}

impl AttrFilter<'_> {
    fn matches(&self, element: &ElementRef<'_>) -> bool {
        let value = element.value();
        match *self {
            AttrFilter::Any => true,
            AttrFilter::Class(class) => value.classes().any(|c| c == class),
            AttrFilter::Id(id) => value.id() == Some(id),
            AttrFilter::Has(name) => value.attr(name).is_some(),
        }
    }
}

fn is_match(element: &ElementRef<'_>, tag: &str, filter: AttrFilter<'_>) -> bool {
    element.value().name().eq_ignore_ascii_case(tag) && filter.matches(element)
}

/// Lookup operations over an element subtree.
///
/// Searches never include the element itself, only its descendants (or
/// children, for [`Navigate::find_children`]), always in document order.
pub trait Navigate<'a> {
    /// First descendant element with the given tag that passes `filter`.
    fn find(&self, tag: &str, filter: AttrFilter<'_>) -> Option<ElementRef<'a>>;

    /// All descendant elements with the given tag that pass `filter`.
    fn find_all(&self, tag: &str, filter: AttrFilter<'_>) -> Vec<ElementRef<'a>>;

    /// Direct child elements with the given tag that pass `filter`.
    fn find_children(&self, tag: &str, filter: AttrFilter<'_>) -> Vec<ElementRef<'a>>;

    /// First direct text child that is not blank. Text inside nested
    /// elements is not considered.
    fn own_text(&self) -> Option<&'a str>;

    /// Concatenation of every text node in the subtree.
    fn rendered_text(&self) -> String;
}

impl<'a> Navigate<'a> for ElementRef<'a> {
    fn find(&self, tag: &str, filter: AttrFilter<'_>) -> Option<ElementRef<'a>> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|el| is_match(el, tag, filter))
    }

    fn find_all(&self, tag: &str, filter: AttrFilter<'_>) -> Vec<ElementRef<'a>> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| is_match(el, tag, filter))
            .collect()
    }

    fn find_children(&self, tag: &str, filter: AttrFilter<'_>) -> Vec<ElementRef<'a>> {
        self.children()
            .filter_map(ElementRef::wrap)
            .filter(|el| is_match(el, tag, filter))
            .collect()
    }

    fn own_text(&self) -> Option<&'a str> {
        self.children()
            .filter_map(|node| node.value().as_text())
            .map(|text| &**text)
            .find(|text| !text.trim().is_empty())
    }

    fn rendered_text(&self) -> String {
        self.text().collect()
    }
}

/// Root element of a parsed document.
pub fn root(document: &Html) -> ElementRef<'_> {
    document.root_element()
}
