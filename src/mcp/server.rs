//! MCP server implementation for Maven version lookups.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: Capability negotiation and version agreement
//! 2. **Operation**: Handling tool calls and other requests
//! 3. **Shutdown**: Graceful connection termination
//!
//! The server exposes a single tool, `get_maven_latest_version`. Requests are
//! handled one at a time and nothing is remembered between them apart from
//! the lifecycle state.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::maven::{self, MavenCentralClient, SearchService, INVALID_DEPENDENCY_MESSAGE};
use crate::mcp::protocol::{
    parse_message, ErrorCode, IncomingMessage, JsonRpcError, JsonRpcErrorData,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, OutgoingMessage, MCP_PROTOCOL_VERSION,
    SERVER_NAME,
};
use crate::mcp::transport::{StdioTransport, Transport};

/// Name of the only tool this server offers.
pub const TOOL_NAME: &str = "get_maven_latest_version";

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolCapabilities>,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            tools: Some(ToolCapabilities::default()),
        }
    }
}

/// Tool-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change during the session.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires fn(&T) -> bool
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    pub protocol_version: String,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: Value,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// A tool definition for tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }
}

impl From<maven::ToolOutcome> for ToolCallResult {
    fn from(outcome: maven::ToolOutcome) -> Self {
        if outcome.is_error() {
            Self::error(outcome.text())
        } else {
            Self::text(outcome.text())
        }
    }
}

/// Returns the list of available tools.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        name: TOOL_NAME.to_string(),
        description: Some(
            "Get the latest published version of a Maven dependency from Maven Central. \
             Returns the bare version string, e.g. \"6.1.2\"."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "dependency": {
                    "type": "string",
                    "description": "Maven coordinate in the format \"groupId:artifactId\" \
                                    (e.g. \"org.springframework:spring-core\")"
                }
            },
            "required": ["dependency"]
        }),
    }]
}

/// The MCP server for Maven version lookups.
pub struct McpServer<S = MavenCentralClient> {
    /// Current server state.
    state: ServerState,
    /// Search backend, created once and reused for every call.
    search: S,
    /// Negotiated protocol version (set after initialisation).
    protocol_version: Option<String>,
}

impl<S: SearchService> McpServer<S> {
    /// Creates a new MCP server backed by `search`.
    #[must_use]
    pub const fn new(search: S) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            search,
            protocol_version: None,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the negotiated protocol version, once initialised.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Runs the server over stdio until EOF or an interrupt signal.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut transport = StdioTransport::stdio();
        self.serve_and_close(&mut transport, shutdown_signal()).await
    }

    /// Serves `transport`, then flushes and closes its output.
    ///
    /// A serving error takes precedence over a close error; the latter is
    /// only logged in that case.
    async fn serve_and_close<R, W, F>(
        &mut self,
        transport: &mut Transport<R, W>,
        shutdown: F,
    ) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        F: Future<Output = ()>,
    {
        let result = self.serve(transport, shutdown).await;
        let closed = transport.close().await;
        if let (Err(serve_err), Err(close_err)) = (&result, &closed) {
            tracing::warn!(error = %close_err, "Failed to close output after server error: {serve_err}");
        }
        result.and(closed)
    }

    /// Serves requests from `transport` until EOF or `shutdown` resolves.
    ///
    /// A request already being handled when `shutdown` fires is finished
    /// and answered first.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn serve<R, W, F>(
        &mut self,
        transport: &mut Transport<R, W>,
        shutdown: F,
    ) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = transport.read_line() => {
                    let reply = match line_result {
                        Ok(Some(line)) => self.handle_line(&line).await,
                        Ok(None) => {
                            tracing::info!("Input closed, shutting down");
                            self.state = ServerState::ShuttingDown;
                            return Ok(());
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                            tracing::debug!(error = %e, "Rejected non-UTF-8 input line");
                            Some(JsonRpcError::parse_error().into())
                        }
                        Err(e) => return Err(e),
                    };

                    if let Some(reply) = reply {
                        transport.write_message(&reply).await?;
                    }
                }
            }
        }
    }

    /// Handles a single line of input.
    ///
    /// Returns the message to send back, or `None` for blank lines and
    /// notifications.
    pub async fn handle_line(&mut self, line: &str) -> Option<OutgoingMessage> {
        if line.trim().is_empty() {
            return None;
        }

        match parse_message(line) {
            Ok(msg) => {
                tracing::trace!(method = msg.method(), id = ?msg.id(), "Received message");
                match msg {
                    IncomingMessage::Request(req) => Some(self.handle_request(req).await),
                    IncomingMessage::Notification(ref notif) => {
                        self.handle_notification(notif);
                        None
                    }
                }
            }
            Err(error) => {
                tracing::debug!(code = error.error.code, "Rejected malformed message");
                Some(error.into())
            }
        }
    }

    /// Handles an incoming request.
    async fn handle_request(&mut self, req: JsonRpcRequest) -> OutgoingMessage {
        tracing::debug!(id = %req.id, method = %req.method, "Handling request");

        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "tools/list" => Ok(Self::handle_tools_list(&req)),
            "tools/call" => self.handle_tools_call(&req).await,
            "ping" => Ok(Self::handle_ping(&req)),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        match response {
            Ok(resp) => resp.into(),
            Err(error) => error.into(),
        }
    }

    /// Handles an incoming notification.
    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        if notif.method == "notifications/initialized" && self.state == ServerState::Initialising {
            self.state = ServerState::Running;
            tracing::info!("Client initialised");
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::new(
                Some(req.id.clone()),
                JsonRpcErrorData::with_message(
                    ErrorCode::InvalidRequest,
                    "Server already initialised",
                ),
            ));
        }

        let params: InitializeParams = req
            .params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| {
                JsonRpcError::invalid_params(
                    req.id.clone(),
                    format!("Invalid initialize params: {e}"),
                )
            })?
            .ok_or_else(|| {
                JsonRpcError::invalid_params(req.id.clone(), "Missing initialize params")
            })?;

        tracing::info!(
            client = params.client_info.as_ref().map_or("unknown", |c| c.name.as_str()),
            requested_version = %params.protocol_version,
            "Initialising session"
        );

        let negotiated_version = MCP_PROTOCOL_VERSION.to_string();

        self.protocol_version = Some(negotiated_version.clone());
        self.state = ServerState::Initialising;

        let result = json!({
            "protocolVersion": negotiated_version,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/list request.
    fn handle_tools_list(req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(req.id.clone(), json!({ "tools": tool_definitions() }))
    }

    /// Handles the tools/call request.
    async fn handle_tools_call(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        let params: ToolCallParams = req
            .params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| {
                JsonRpcError::invalid_params(
                    req.id.clone(),
                    format!("Invalid tool call params: {e}"),
                )
            })?
            .ok_or_else(|| {
                JsonRpcError::invalid_params(req.id.clone(), "Missing tool call params")
            })?;

        if params.name != TOOL_NAME {
            return Err(JsonRpcError::unknown_tool(req.id.clone(), &params.name));
        }

        let coordinate = maven::validate(&params.arguments).map_err(|reason| {
            tracing::debug!(%reason, "Rejected tool arguments");
            JsonRpcError::invalid_params(req.id.clone(), INVALID_DEPENDENCY_MESSAGE)
        })?;

        let outcome = maven::latest_version(&self.search, &coordinate)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, coordinate = %coordinate, "Latest version lookup failed");
                JsonRpcError::internal_error(req.id.clone(), e.to_string())
            })?;

        let result_value = serde_json::to_value(ToolCallResult::from(outcome)).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialise tool call result");
            JsonRpcError::internal_error(
                req.id.clone(),
                "Internal error: failed to serialise result",
            )
        })?;

        Ok(JsonRpcResponse::success(req.id.clone(), result_value))
    }

    /// Handles the ping request.
    fn handle_ping(req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(req.id.clone(), json!({}))
    }
}

/// Resolves on SIGINT or SIGTERM.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (Ok(mut sigint), Ok(mut sigterm)) = (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) else {
        tracing::warn!("Failed to install signal handlers, relying on EOF for shutdown");
        return std::future::pending().await;
    };

    tokio::select! {
        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown"),
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

/// Resolves on Ctrl+C.
#[cfg(windows)]
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("Failed to install Ctrl+C handler, relying on EOF for shutdown");
        return std::future::pending().await;
    }
    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
}
