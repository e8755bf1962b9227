//! Retrieve → extract → persist
//!
//! The pipeline owns handles to its collaborators. Nothing is global; the
//! server builds one pipeline at startup and shares it through its state.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn, Span};

use crate::error::{Error, Result};
use crate::extraction::{ExtractOptions, ListingExtractor, ListingRecord};
use crate::retriever::HttpRetriever;
use crate::store::{validate_collection, RecordStore};

/// Listing ingestion pipeline.
#[derive(Clone)]
pub struct Pipeline {
    retriever: HttpRetriever,
    store: Arc<dyn RecordStore>,
    extractor: ListingExtractor,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("retriever", &self.retriever)
            .field("extractor", &self.extractor)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Assemble a pipeline from its collaborators.
    pub fn new(
        retriever: HttpRetriever,
        store: Arc<dyn RecordStore>,
        options: ExtractOptions,
    ) -> Self {
        Self {
            retriever,
            store,
            extractor: ListingExtractor::with_options(options),
        }
    }

    /// The store records are saved to.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Fetch `url`, extract its listing, save it in `collection`.
    ///
    /// Returns the id generated by the store.
    ///
    /// # Errors
    ///
    /// - [`Error::Store`] for an invalid collection name, checked before any fetch
    /// - [`Error::Fetch`] when the page cannot be retrieved
    /// - [`Error::Structural`] when the page is not a listing
    /// - [`Error::Store`] when saving fails
    #[instrument(skip(self))]
    pub async fn process(&self, url: &str, collection: &str) -> Result<String> {
        validate_collection(collection)?;
        info!("processing url");

        let raw = self.retriever.fetch(url).await?;

        let extractor = self.extractor;
        let store = Arc::clone(&self.store);
        let url = url.to_string();
        let collection = collection.to_string();
        let id = run_blocking("extract and save", move || {
            let record = extract_listing(extractor, &raw, &url)?;
            debug!(record = %record.summary(), "parsed record");
            Ok(store.save(&collection, &record)?)
        })
        .await?;

        info!(%id, "saved with id");
        Ok(id)
    }

    /// Fetch and extract without saving.
    ///
    /// # Errors
    ///
    /// [`Error::Fetch`] or [`Error::Structural`].
    #[instrument(skip(self))]
    pub async fn preview(&self, url: &str) -> Result<ListingRecord> {
        let raw = self.retriever.fetch(url).await?;

        let extractor = self.extractor;
        let url = url.to_string();
        run_blocking("extract", move || extract_listing(extractor, &raw, &url)).await
    }

    /// Extract `raw` and attach `url` as its source.
    ///
    /// # Errors
    ///
    /// [`Error::Structural`] when the page is not a listing.
    pub fn extract_document(&self, raw: &str, url: &str) -> Result<ListingRecord> {
        extract_listing(self.extractor, raw, url)
    }
}

fn extract_listing(extractor: ListingExtractor, raw: &str, url: &str) -> Result<ListingRecord> {
    match extractor.extract(raw) {
        Ok(record) => Ok(record.with_url(url)),
        Err(e) => {
            warn!(url, error = %e, "listing page rejected");
            Err(e.into())
        }
    }
}

/// Run parsing and storage work on the blocking pool, inside the caller's span.
async fn run_blocking<T, F>(task: &'static str, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let span = Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(work))
        .await
        .map_err(|e| Error::generic(format!("{task} task failed: {e}")))?
}
