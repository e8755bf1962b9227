//! Structural anchor resolution
//!
//! Every field extractor works relative to one of three nested sections:
//! the page container, the posting body section and the user body. If any
//! of them is missing the page is not a listing and extraction stops.

use scraper::{ElementRef, Html};
use tracing::warn;

use super::navigator::{root, AttrFilter, Navigate};
use crate::error::{Anchor, StructuralError};

/// The three required sections of a listing page.
#[derive(Debug, Clone, Copy)]
pub struct Anchors<'a> {
    /// `section.page-container`
    pub page_container: ElementRef<'a>,
    /// `section.body`, inside the page container
    pub body: ElementRef<'a>,
    /// `section.userbody`, inside the body
    pub user_body: ElementRef<'a>,
}

impl<'a> Anchors<'a> {
    /// Resolve page container, body and user body, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError::MissingAnchor`] naming the first section
    /// that could not be found.
    pub fn resolve(document: &'a Html) -> Result<Self, StructuralError> {
        let page_container = require(
            root(document).find("section", AttrFilter::Class("page-container")),
            Anchor::PageContainer,
        )?;
        let body = require(
            page_container.find("section", AttrFilter::Class("body")),
            Anchor::Body,
        )?;
        let user_body = require(
            body.find("section", AttrFilter::Class("userbody")),
            Anchor::UserBody,
        )?;

        Ok(Self {
            page_container,
            body,
            user_body,
        })
    }
}

/// Turn an optional lookup into a hard requirement.
pub(crate) fn require<T>(found: Option<T>, anchor: Anchor) -> Result<T, StructuralError> {
    found.ok_or_else(|| {
        warn!(anchor = %anchor, "required listing element missing");
        StructuralError::MissingAnchor(anchor)
    })
}
