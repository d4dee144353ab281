//! maven-version-mcp: MCP server that reports the latest published version
//! of a Maven artifact.
//!
//! An AI assistant calls the `get_maven_latest_version` tool with a
//! `"groupId:artifactId"` coordinate; the server asks the Maven Central
//! search API for the newest GAV record and answers with its version string.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types
//! - [`maven`] — Coordinate validation, query construction and result reduction
//! - [`mcp`] — MCP protocol implementation

pub mod config;
pub mod error;
pub mod maven;
pub mod mcp;
