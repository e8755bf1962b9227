//! Listing ingestion routes
//!
//! `POST /{collection}` with a form field `PostUrl` fetches the listing,
//! extracts it and saves it in `collection`. The response body is the new
//! record id as plain text.
//!
//! ```bash
//! curl -d PostUrl=https://sfbay.craigslist.org/sby/mcy/6299581569.html \
//!     http://localhost:5000/motorcycles
//! # 3f0c2b8e9a4d4b7c8e1f5a6b7c8d9e0f
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use super::status::{AppState, REQUEST_FAILURE};
use crate::error::{Error, FetchError, StoreError};

/// Greeting served at `/`
pub const INDEX_GREETING: &str = "Hello. Who are you?";

/// Greeting served on `GET /{collection}`
pub const COLLECTION_GREETING: &str = "Hmm. Still... Who are you?";

/// Form body of an ingestion request
#[derive(Debug, Clone, Deserialize)]
pub struct IngestForm {
    /// Listing URL to fetch
    #[serde(rename = "PostUrl")]
    pub post_url: String,
}

/// `GET /`
pub async fn index_handler() -> &'static str {
    INDEX_GREETING
}

/// `GET /{collection}`
pub async fn collection_handler(Path(_collection): Path<String>) -> &'static str {
    COLLECTION_GREETING
}

/// `POST /{collection}`
///
/// A body without a `PostUrl` field is answered with 400 and counted as a
/// request failure.
#[instrument(skip_all)]
pub async fn ingest_handler(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    payload: Result<Form<IngestForm>, FormRejection>,
) -> Response {
    let form = match payload {
        Ok(Form(form)) => form,
        Err(rejection) => {
            state.record_failure(REQUEST_FAILURE);
            warn!(%collection, error = %rejection.body_text(), "malformed ingestion request");
            return (StatusCode::BAD_REQUEST, rejection.body_text()).into_response();
        }
    };

    let started = Instant::now();
    let result = state
        .pipeline()
        .process(&form.post_url, &collection)
        .await;
    state.record_latency(started.elapsed());

    match result {
        Ok(id) => {
            state.record_saved();
            info!(%id, %collection, url = %form.post_url, "listing ingested");
            (StatusCode::OK, id).into_response()
        }
        Err(e) => {
            state.record_failure(e.kind());
            let status = status_for(&e);
            if status.is_server_error() {
                error!(error = %e, url = %form.post_url, "ingestion failed");
            } else {
                warn!(error = %e, url = %form.post_url, "ingestion rejected");
            }
            (status, e.to_string()).into_response()
        }
    }
}

/// HTTP status for a pipeline error.
///
/// A page without the listing layout is the client's problem (422), a
/// failing upstream is a bad gateway (502), storage failures are ours (500).
pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::Structural(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Fetch(FetchError::InvalidUrl(_)) => StatusCode::BAD_REQUEST,
        Error::Fetch(_) => StatusCode::BAD_GATEWAY,
        Error::Store(StoreError::InvalidCollection(_)) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Anchor, StructuralError};

    #[test]
    fn test_status_for() {
        assert_eq!(
            status_for(&StructuralError::MissingAnchor(Anchor::Body).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&FetchError::InvalidUrl("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(
                &FetchError::HttpStatus {
                    status: 404,
                    url: "u".into()
                }
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&StoreError::InvalidCollection("a b".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&StoreError::Io(std::io::Error::other("disk")).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_greetings() {
        assert_eq!(index_handler().await, "Hello. Who are you?");
        assert_eq!(
            collection_handler(Path("bikes".to_string())).await,
            "Hmm. Still... Who are you?"
        );
    }
}
