//! Error types for Marine Regions query operations.

use thiserror::Error;

/// Result type alias using MrError.
pub type MrResult<T> = Result<T, MrError>;

/// Pipeline stage an error belongs to.
///
/// Validation errors never touch the network, network errors carry the
/// offending URL, payload errors mean the declared format did not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Validation,
    Network,
    Payload,
}

/// Primary error type for catalog, query and normalization operations.
#[derive(Debug, Error)]
pub enum MrError {
    // === Validation Errors ===
    #[error("Unknown data product: {0}")]
    UnknownProduct(String),

    #[error("Column '{column}' is not declared for data product '{product}'")]
    UnknownColumn { product: String, column: String },

    #[error("Both a CQL filter and an OGC XML filter were supplied; use only one")]
    ConflictingFilter,

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    // === Network Errors ===
    #[error("Endpoint unreachable: {url} ({cause})")]
    EndpointUnreachable { url: String, cause: String },

    #[error("Endpoint {url} returned error status {status}{}", detail_suffix(.detail))]
    EndpointErrorStatus {
        url: String,
        status: u16,
        detail: Option<String>,
    },

    #[error("Request {url} failed with status {status}{}", detail_suffix(.detail))]
    RequestErrorStatus {
        url: String,
        status: u16,
        detail: Option<String>,
    },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    // === Payload Errors ===
    #[error("Response format not supported for normalization: {0}")]
    UnsupportedFormat(String),

    #[error("Malformed {format} payload: {message}")]
    MalformedPayload { format: String, message: String },

    #[error("No gazetteer record for MRGID {0}")]
    UnknownIdentifier(u64),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {}", d),
        None => String::new(),
    }
}

impl MrError {
    /// Shorthand for a payload that failed to parse as its declared format.
    pub fn malformed(format: impl Into<String>, message: impl Into<String>) -> Self {
        MrError::MalformedPayload {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        MrError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Get the pipeline stage this error was raised in.
    pub fn stage(&self) -> ErrorStage {
        match self {
            MrError::UnknownProduct(_)
            | MrError::UnknownColumn { .. }
            | MrError::ConflictingFilter
            | MrError::InvalidParameter { .. }
            | MrError::Config(_) => ErrorStage::Validation,

            MrError::EndpointUnreachable { .. }
            | MrError::EndpointErrorStatus { .. }
            | MrError::RequestErrorStatus { .. }
            | MrError::Transport { .. } => ErrorStage::Network,

            MrError::UnsupportedFormat(_)
            | MrError::MalformedPayload { .. }
            | MrError::UnknownIdentifier(_) => ErrorStage::Payload,
        }
    }

    /// The URL involved in a network-stage error.
    pub fn url(&self) -> Option<&str> {
        match self {
            MrError::EndpointUnreachable { url, .. }
            | MrError::EndpointErrorStatus { url, .. }
            | MrError::RequestErrorStatus { url, .. }
            | MrError::Transport { url, .. } => Some(url),
            _ => None,
        }
    }

    /// The HTTP status reported by the remote service, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            MrError::EndpointErrorStatus { status, .. }
            | MrError::RequestErrorStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MrError {
    fn from(err: serde_json::Error) -> Self {
        MrError::malformed("JSON", err.to_string())
    }
}

impl From<serde_yaml::Error> for MrError {
    fn from(err: serde_yaml::Error) -> Self {
        MrError::Config(format!("YAML error: {}", err))
    }
}
