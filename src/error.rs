//! Error types for classified-extract
//!
//! This module provides the error hierarchy using `thiserror`. Extraction
//! has exactly one fatal class, [`StructuralError`], raised when a required
//! anchor is missing from the listing page. Everything optional degrades to
//! `None` inside the extractors and never surfaces here.

use std::fmt;

use thiserror::Error;

/// The main error type for classified-extract operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required element of the listing page is missing
    #[error("Structural error: {0}")]
    Structural(#[from] StructuralError),

    /// Retrieving the listing page failed
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Persisting the extracted record failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// A required structural element of a listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// `section.page-container`
    PageContainer,
    /// `section.body` inside the page container
    Body,
    /// `section.userbody` inside the body
    UserBody,
    /// The document `<title>`
    Title,
    /// `time[datetime]` inside the body header's display date
    PostDate,
    /// `div#thumbs` inside the user body's figure
    Thumbnails,
    /// `section#postingbody`
    PostingBody,
    /// `ul.notices`
    Notices,
}

impl Anchor {
    /// Selector-like description used in error messages and logs.
    pub fn describe(self) -> &'static str {
        match self {
            Anchor::PageContainer => "section.page-container",
            Anchor::Body => "section.body",
            Anchor::UserBody => "section.userbody",
            Anchor::Title => "title",
            Anchor::PostDate => "header p#display-date time[datetime]",
            Anchor::Thumbnails => "figure div#thumbs",
            Anchor::PostingBody => "section#postingbody",
            Anchor::Notices => "ul.notices",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Fatal extraction failure: the document does not have the listing layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// A required anchor element was not found
    #[error("required element missing: {0}")]
    MissingAnchor(Anchor),
}

impl StructuralError {
    /// The anchor that was missing.
    pub fn anchor(&self) -> Anchor {
        match self {
            StructuralError::MissingAnchor(anchor) => *anchor,
        }
    }
}

/// Listing retrieval errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Non-success HTTP status
    #[error("HTTP error {status} from {url}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Network, TLS or body decoding failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Record persistence errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Collection name is empty or contains unsupported characters
    #[error("Invalid collection name: {0:?}")]
    InvalidCollection(String),

    /// Record could not be serialized
    #[error("Record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Backing storage failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for classified-extract operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Create a configuration error from a string
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Short machine-friendly label, used for failure counters.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Structural(_) => "structural",
            Error::Fetch(_) => "fetch",
            Error::Store(_) => "store",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Config(_) => "config",
            Error::Generic(_) => "generic",
        }
    }
}
