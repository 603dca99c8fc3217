use thiserror::Error;

/// Failure at an external source boundary.
///
/// `Transport` covers everything that kept a response from arriving intact
/// (network errors, non-2xx statuses); `Parse` means the response arrived but
/// its expected structure was missing. The distinction drives retry policy:
/// transport failures on availability queries get one retry, parse failures
/// never do.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport failure{}: {}", status_suffix(.status), .message)]
    Transport {
        status: Option<u16>,
        message: String,
    },
    #[error("parse failure: {0}")]
    Parse(String),
}

impl SourceError {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// HTTP status code, when the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::Parse(_) => None,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}
