//! Reduction of a search reply into the single result of a tool call.

use crate::error::SearchError;
use crate::maven::client::SearchResponse;
use crate::maven::coordinate::Coordinate;

/// Prefix for upstream failures shown to the client.
pub const API_ERROR_PREFIX: &str = "Maven Central API error: ";

/// What one `get_maven_latest_version` call resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Newest published version.
    Success(String),
    /// The registry knows no release of this coordinate.
    NotFound {
        /// Requested group id.
        group_id: String,
        /// Requested artifact id.
        artifact_id: String,
    },
    /// The registry (or the network in front of it) reported a failure.
    Error(String),
}

impl ToolOutcome {
    /// The single line of text sent back to the client.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Success(version) => version.clone(),
            Self::NotFound {
                group_id,
                artifact_id,
            } => format!("No Maven dependency found for {group_id}:{artifact_id}"),
            Self::Error(message) => format!("{API_ERROR_PREFIX}{message}"),
        }
    }

    /// Whether the result carries the error flag.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        !matches!(self, Self::Success(_))
    }
}

/// Classifies a search result.
///
/// Takes the first document as-is; ordering is the service's job.
///
/// # Errors
///
/// [`SearchError::Unexpected`] is passed through untouched. Upstream
/// failures become [`ToolOutcome::Error`].
pub fn reduce(
    coordinate: &Coordinate,
    result: Result<SearchResponse, SearchError>,
) -> Result<ToolOutcome, SearchError> {
    match result {
        Ok(reply) => Ok(reply.response.docs.into_iter().next().map_or_else(
            || ToolOutcome::NotFound {
                group_id: coordinate.group_id.clone(),
                artifact_id: coordinate.artifact_id.clone(),
            },
            |doc| ToolOutcome::Success(doc.v),
        )),
        Err(SearchError::Upstream { message }) => Ok(ToolOutcome::Error(message)),
        Err(err @ SearchError::Unexpected(_)) => Err(err),
    }
}
