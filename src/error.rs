use serde::ser::Serializer;
use serde::Serialize;
use std::fmt;

/// Error taxonomy for the upload form. Every variant is terminal for the
/// current attempt; the frontend renders the Display text as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Pre-upload rejection (file size / type), no network activity happened.
    Validation(String),
    /// Preview generation failed; the selection itself is kept.
    Read(String),
    /// The service answered with a non-2xx status.
    Server { status: u16, detail: String },
    /// The request never got a response (connect failure or timeout).
    Network { url: String },
    /// Catch-all for local failures.
    Unexpected(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) | AppError::Read(msg) => write!(f, "{}", msg),
            AppError::Server { status, detail } => {
                write!(f, "Server error ({}): {}", status, detail)
            }
            AppError::Network { url } => write!(
                f,
                "Network error: Unable to connect to the server at {}. Please check if your backend is running.",
                url
            ),
            AppError::Unexpected(msg) => write!(f, "An unexpected error occurred: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// The webview only needs the message string.
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Unexpected(err.to_string())
    }
}
