//! Structural validation of `get_maven_latest_version` arguments.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Message returned to the client for every rejected payload.
pub const INVALID_DEPENDENCY_MESSAGE: &str =
    "Invalid dependency format. Expected \"groupId:artifactId\"";

/// A library coordinate without a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    /// Maven `groupId`, e.g. `org.springframework`.
    pub group_id: String,
    /// Maven `artifactId`, e.g. `spring-core`.
    pub artifact_id: String,
}

impl Coordinate {
    /// Splits `dependency` on its first `:`.
    ///
    /// Anything after a second colon stays in the artifact id, so
    /// `"a:b:c"` yields group `a` and artifact `b:c`. Empty halves are
    /// accepted as-is.
    #[must_use]
    pub fn parse(dependency: &str) -> Option<Self> {
        let (group_id, artifact_id) = dependency.split_once(':')?;
        Some(Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
        })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// Why a payload was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidCoordinate {
    /// Arguments were `null`, an array, a scalar, or absent.
    #[error("arguments must be an object")]
    NotAnObject,
    /// The object has no `dependency` field.
    #[error("missing `dependency` field")]
    MissingDependency,
    /// `dependency` is present but not a string.
    #[error("`dependency` must be a string")]
    NotAString,
    /// `dependency` contains no `:`.
    #[error("`dependency` has no ':' separator")]
    MissingSeparator,
}

/// Accepts or rejects an untyped argument payload as a coordinate request.
///
/// # Errors
///
/// Returns the first structural problem found.
pub fn validate(payload: &Value) -> Result<Coordinate, InvalidCoordinate> {
    let object = payload.as_object().ok_or(InvalidCoordinate::NotAnObject)?;
    let dependency = object
        .get("dependency")
        .ok_or(InvalidCoordinate::MissingDependency)?
        .as_str()
        .ok_or(InvalidCoordinate::NotAString)?;

    Coordinate::parse(dependency).ok_or(InvalidCoordinate::MissingSeparator)
}
