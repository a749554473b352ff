use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_envelope, Envelope, SchemaRef};
use crate::error::{EnvelopeError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete envelopes to any `Write` stream.
///
/// The header and payload are buffered and written as one contiguous
/// sequence, so a reader never observes a header without its payload.
pub struct EnvelopeWriter<W> {
    inner: W,
    buf: BytesMut,
}

impl<W: Write> EnvelopeWriter<W> {
    /// Create a new envelope writer.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Write a complete envelope (blocking).
    pub fn write_envelope(&mut self, envelope: &Envelope) -> Result<()> {
        self.send(envelope.marker, envelope.schema_ref, envelope.payload.as_ref())
    }

    /// Encode and send a header followed by payload bytes.
    pub fn send(&mut self, marker: u8, schema_ref: SchemaRef, payload: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_envelope(marker, schema_ref, payload, &mut self.buf);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(EnvelopeError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(EnvelopeError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(EnvelopeError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
