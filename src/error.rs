//! Adapter-local failure taxonomy. None of these ever leave a source adapter.

use thiserror::Error;

use crate::http_client::HttpError;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream unreachable, timed out, or body unreadable.
    #[error(transparent)]
    Transport(#[from] HttpError),

    /// Upstream answered with a non-2xx status.
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode upstream payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Required adapter configuration (usually a credential) is absent.
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    /// Adapter configuration is present but unusable (e.g. a bad base URL).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FetchError {
    /// Stable label for logs and metric labels.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::Decode(_) => "decode",
            Self::MissingConfig(_) => "missing_config",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        let decode = serde_json::from_str::<u32>("nope").unwrap_err();
        assert_eq!(FetchError::from(decode).kind(), "decode");
        assert_eq!(
            FetchError::from(HttpError::Timeout("t".into())).kind(),
            "transport"
        );
        assert_eq!(
            FetchError::Status {
                status: 401,
                body: String::new()
            }
            .kind(),
            "status"
        );
        assert_eq!(FetchError::MissingConfig("NEWS_API_KEY").kind(), "missing_config");
    }

    #[test]
    fn status_error_mentions_code_and_body() {
        let e = FetchError::Status {
            status: 429,
            body: "rate limited".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("rate limited"));
    }
}
