use std::path::PathBuf;

/// Errors that can occur while materializing or executing an API call.
///
/// Build errors (unsupported content type, unreadable attachment, unresolved
/// URL...) carry enough context to be rendered on a single line. Transport
/// errors are the untouched [`reqwest::Error`].
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum PicaError {
    /// HTTP client error from the underlying reqwest library.
    ///
    /// Occurs when network requests fail, timeouts occur, or connection issues arise.
    ReqwestError(reqwest::Error),

    /// URL parsing error when constructing request URLs.
    UrlError(url::ParseError),

    /// Invalid HTTP header name.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// Invalid HTTP header value.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// JSON serialization error.
    ///
    /// Occurs when the parameter bag cannot be marshalled as a JSON object.
    JsonValueError(serde_json::Error),

    /// Form serialization error.
    FormSerializationError(serde_urlencoded::ser::Error),

    /// The declared `Content-Type` has no body encoder.
    #[display("Unsupported content type '{content_type}' for {method} request")]
    #[from(skip)]
    UnsupportedContentType {
        /// The declared content type, empty when the header is missing.
        content_type: String,
        /// The request method.
        method: String,
    },

    /// The scope binding for a name does not have the expected shape.
    #[display("Malformed scope binding '{name}': expected {expected}, got {kind}")]
    #[from(skip)]
    MalformedScope {
        /// The looked up name.
        name: String,
        /// The expected kind.
        expected: &'static str,
        /// The actual kind found in scope.
        kind: &'static str,
    },

    /// A multipart attachment could not be read.
    #[display("{message} '{}': {source}", path.display())]
    #[from(skip)]
    Attachment {
        /// What failed (open, copy...).
        message: &'static str,
        /// The attachment path.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },

    /// Writing a multipart part into the body buffer failed.
    #[display("Write form field '{name}' failed: {source}")]
    #[from(skip)]
    MultipartWrite {
        /// The field name.
        name: String,
        /// The underlying I/O failure.
        source: std::io::Error,
    },

    /// A multipart boundary that cannot delimit parts.
    #[display("Invalid multipart boundary '{boundary}'")]
    #[from(skip)]
    InvalidBoundary {
        /// The rejected boundary.
        boundary: String,
    },

    /// URL template contains unresolved placeholders.
    #[display("Path '{path}' is missing required arguments: {missings:?}")]
    #[from(skip)]
    PathUnresolved {
        /// The template that couldn't be resolved.
        path: String,
        /// List of missing placeholder names.
        missings: Vec<String>,
    },

    /// The profile directory could not be created or inspected.
    #[display("Profile directory '{}' unavailable: {source}", path.display())]
    #[from(skip)]
    Profile {
        /// The profile directory.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },

    /// No home directory to host the profile.
    #[display("Cannot locate the user home directory")]
    #[from(skip)]
    MissingHomeDirectory,
}
