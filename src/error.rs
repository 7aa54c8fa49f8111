//! Error types.
//!
//! Errors are `Clone` so the client can publish the latest one through a
//! watch channel.

/// A frame that could not be turned into a known message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("message has no `type` field")]
    MissingType,

    #[error("unknown message type `{0}`")]
    UnknownType(String),

    #[error("invalid `{message_type}` message: {reason}")]
    InvalidFields { message_type: String, reason: String },

    #[error("failed to encode message: {0}")]
    Encode(String),
}

/// Everything that can go wrong in the client.
///
/// None of these are fatal: each one is recorded on the client's last-error
/// observable as well as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Could not connect, or an established connection was lost.
    #[error("connection error: {0}")]
    Connection(String),

    /// An inbound frame was dropped.
    #[error("protocol error: {0}")]
    ProtocolDecode(#[from] ProtocolError),

    #[error("not connected to a server")]
    SendWithoutConnection,

    /// A command failed local validation and was not sent.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// A newer `connect` call replaced this attempt before it finished.
    #[error("connection attempt superseded by a newer one")]
    Superseded,
}
