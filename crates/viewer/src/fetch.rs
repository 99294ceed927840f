use formats::ZoneDocumentError;

/// Failure of one zone or catalog fetch, transport-agnostic.
///
/// The wasm app maps its HTTP client's errors into this before handing
/// the completion to the controller.
#[derive(Debug)]
pub enum ZoneFetchError {
    /// The server answered with a non-success status.
    Http { status: u16 },
    /// The request never completed (DNS, connection, abort).
    Network(String),
    /// The body arrived but is not a usable zone document.
    Decode(ZoneDocumentError),
}

impl std::fmt::Display for ZoneFetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneFetchError::Http { status } => write!(f, "HTTP {status}"),
            ZoneFetchError::Network(msg) => write!(f, "network error: {msg}"),
            ZoneFetchError::Decode(err) => write!(f, "decode error: {err}"),
        }
    }
}

impl std::error::Error for ZoneFetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ZoneFetchError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ZoneDocumentError> for ZoneFetchError {
    fn from(err: ZoneDocumentError) -> Self {
        ZoneFetchError::Decode(err)
    }
}
