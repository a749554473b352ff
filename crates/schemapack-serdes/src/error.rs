use schemapack_envelope::EnvelopeError;
use schemapack_registry::RegistryError;

use crate::codec::CodecError;

/// Errors that can occur during serialize/deserialize orchestration.
///
/// Every failure aborts the enclosing call; nothing is swallowed and no
/// partial envelope is recovered.
#[derive(Debug, thiserror::Error)]
pub enum SerdesError {
    /// No schema policy exists for the input value's shape.
    #[error("unsupported value type: {0}")]
    UnsupportedValueType(String),

    /// The envelope carries a protocol marker this version does not read.
    #[error("unsupported protocol marker 0x{marker:02X}")]
    UnsupportedProtocol { marker: u8 },

    /// Schema registration failed; surfaces the registry's verdict
    /// (invalid, incompatible, or unknown metadata) to the caller.
    #[error("schema registration failed: {0}")]
    Registration(#[source] RegistryError),

    /// Schema resolution failed at decode time. Fatal for the message:
    /// the embedded reference is immutable.
    #[error("schema resolution failed: {0}")]
    Resolution(#[source] RegistryError),

    /// The structured codec rejected the value during encoding.
    #[error("payload encoding failed: {0}")]
    Encoding(#[source] CodecError),

    /// The payload bytes could not be decoded under the resolved schema.
    #[error("payload decoding failed: {0}")]
    Decoding(#[source] CodecError),

    /// Envelope-level failure (truncated header, I/O).
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

pub type Result<T> = std::result::Result<T, SerdesError>;
