//! Latest-version lookup against the Maven Central search API.
//!
//! One lookup runs four steps in order, none of which keeps state:
//!
//! ```text
//! arguments ──▶ validate ──▶ SearchQuery ──▶ SearchService ──▶ reduce ──▶ ToolOutcome
//!  (Value)     (Coordinate)                   (HTTP GET)
//! ```
//!
//! Invalid arguments stop at [`coordinate::validate`] and never reach the
//! network.

pub mod client;
pub mod coordinate;
pub mod outcome;
pub mod query;

pub use client::{MavenCentralClient, SearchDoc, SearchResponse, SearchService};
pub use coordinate::{validate, Coordinate, InvalidCoordinate, INVALID_DEPENDENCY_MESSAGE};
pub use outcome::{reduce, ToolOutcome};
pub use query::SearchQuery;

use crate::error::SearchError;

/// Looks up the newest published version of `coordinate`.
///
/// # Errors
///
/// Only [`SearchError::Unexpected`]; upstream failures are folded into
/// [`ToolOutcome::Error`].
pub async fn latest_version<S: SearchService>(
    service: &S,
    coordinate: &Coordinate,
) -> Result<ToolOutcome, SearchError> {
    let query = SearchQuery::for_coordinate(coordinate);
    let result = service.search(&query).await;
    let outcome = reduce(coordinate, result)?;

    tracing::debug!(
        coordinate = %coordinate,
        is_error = outcome.is_error(),
        "Resolved latest version lookup"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct Recording {
        seen: RefCell<Vec<SearchQuery>>,
    }

    impl SearchService for Recording {
        async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError> {
            self.seen.borrow_mut().push(query.clone());
            Ok(serde_json::from_str(r#"{"response":{"docs":[{"v":"33.0.0-jre"}]}}"#).unwrap())
        }
    }

    #[tokio::test]
    async fn lookup_queries_translated_coordinate() {
        let service = Recording {
            seen: RefCell::new(Vec::new()),
        };
        let coordinate = Coordinate::parse("com.google.guava:guava").unwrap();

        let outcome = latest_version(&service, &coordinate).await.unwrap();

        assert_eq!(outcome, ToolOutcome::Success("33.0.0-jre".to_string()));
        let seen = service.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].q, r#"g:"com.google.guava" AND a:"guava""#);
    }
}
