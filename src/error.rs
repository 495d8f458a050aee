//! Client error taxonomy

use thiserror::Error;

/// How an error is surfaced to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Blocking notice; the client does not retry on its own
    Blocking,
    /// Short-lived notice; play continues
    Transient,
    /// Logged at most
    Ignorable,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not connected to the game server")]
    NotConnected,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("escape failed: {0}")]
    EscapeRejected(String),

    #[error("unknown player id: {0}")]
    UnknownPlayer(String),

    #[error("unknown event `{0}`")]
    UnknownEvent(String),

    #[error("malformed `{event}` payload: {source}")]
    Payload {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unusable `{event}` payload: {reason}")]
    InvalidPayload { event: String, reason: &'static str },

    #[error("invalid color `{0}`")]
    InvalidColor(String),

    #[error("no score snapshot for the local player")]
    MissingLocalSnapshot,

    #[error("render backend: {0}")]
    Render(String),
}

impl ClientError {
    pub fn severity(&self) -> Severity {
        match self {
            ClientError::NotConnected
            | ClientError::Connection(_)
            | ClientError::Server(_)
            | ClientError::MissingLocalSnapshot => Severity::Blocking,
            ClientError::EscapeRejected(_) => Severity::Transient,
            ClientError::UnknownPlayer(_)
            | ClientError::UnknownEvent(_)
            | ClientError::Payload { .. }
            | ClientError::InvalidPayload { .. }
            | ClientError::InvalidColor(_)
            | ClientError::Render(_) => Severity::Ignorable,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_taxonomy() {
        assert_eq!(ClientError::Server("x".into()).severity(), Severity::Blocking);
        assert_eq!(
            ClientError::EscapeRejected("low score".into()).severity(),
            Severity::Transient
        );
        assert_eq!(
            ClientError::UnknownPlayer("p9".into()).severity(),
            Severity::Ignorable
        );
        assert_eq!(ClientError::MissingLocalSnapshot.severity(), Severity::Blocking);
        let invalid = ClientError::InvalidPayload {
            event: "player-moved".into(),
            reason: "non-finite position",
        };
        assert_eq!(invalid.severity(), Severity::Ignorable);
    }
}
