use std::io::{ErrorKind, Read};

use crate::codec::{decode_header, Envelope, HEADER_SIZE};
use crate::error::{EnvelopeError, Result};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads one complete envelope from any `Read` stream.
///
/// The payload carries no length prefix, so the payload section is
/// everything between the header and end-of-stream. One stream holds
/// exactly one envelope.
pub struct EnvelopeReader<R> {
    inner: R,
}

impl<R: Read> EnvelopeReader<R> {
    /// Create a new envelope reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Read the envelope (blocking).
    ///
    /// Returns `Err(EnvelopeError::ConnectionClosed)` if the stream ends
    /// before the first header byte, and `TruncatedHeader` if it ends
    /// inside the header.
    pub fn read_envelope(&mut self) -> Result<Envelope> {
        let mut header = [0u8; HEADER_SIZE];
        let mut filled = 0usize;

        while filled < HEADER_SIZE {
            match self.inner.read(&mut header[filled..]) {
                Ok(0) if filled == 0 => return Err(EnvelopeError::ConnectionClosed),
                Ok(0) => return Err(EnvelopeError::TruncatedHeader { len: filled }),
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(EnvelopeError::Io(err)),
            }
        }

        let (marker, schema_ref) = decode_header(&header)?;

        let mut payload = Vec::with_capacity(READ_CHUNK_SIZE);
        loop {
            let mut chunk = [0u8; READ_CHUNK_SIZE];
            match self.inner.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => payload.extend_from_slice(&chunk[..n]),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(EnvelopeError::Io(err)),
            }
        }

        Ok(Envelope {
            marker,
            schema_ref,
            payload: payload.into(),
        })
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}
