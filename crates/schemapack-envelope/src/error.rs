/// Errors that can occur while encoding or decoding envelopes.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// Fewer bytes were available than the fixed 13-byte header requires.
    #[error("truncated envelope header ({len} bytes, need 13)")]
    TruncatedHeader { len: usize },

    /// An I/O error occurred while reading or writing an envelope.
    #[error("envelope I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was closed before a complete envelope was transferred.
    #[error("connection closed (incomplete envelope)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, EnvelopeError>;
