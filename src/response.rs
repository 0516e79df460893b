use crate::constants::status;
use crate::headers::HeaderMap;
use std::fmt;
use std::io::{self, Write};

/// Body producer run by the transport after the handler chain returned.
pub type StreamProducer = Box<dyn FnOnce(&mut StreamSink<'_>) + Send>;

/// Buffered response owned by a context.
pub struct Response {
    status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
    stream: Option<StreamProducer>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: status::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            stream: None,
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .field("streaming", &self.stream.is_some())
            .finish()
    }
}

impl Response {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Buffered bytes; empty for streaming bodies.
    pub fn body(&self) -> &[u8] {
        if self.stream.is_some() {
            &[]
        } else {
            &self.body
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    /// Hands the streaming producer to the transport.
    pub fn take_stream(&mut self) -> Option<StreamProducer> {
        self.stream.take()
    }

    /// Writes the body into `writer`, running the stream producer if any.
    ///
    /// Returns false when the peer went away mid-stream.
    pub fn write_body_to(&mut self, writer: &mut dyn Write) -> bool {
        if let Some(producer) = self.take_stream() {
            let mut sink = StreamSink::new(writer);
            producer(&mut sink);
            let _ = sink.flush();
            return !sink.is_disconnected();
        }
        writer.write_all(self.body()).is_ok()
    }

    pub(crate) fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub(crate) fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub(crate) fn set_body(&mut self, body: &[u8]) {
        self.stream = None;
        self.body.clear();
        self.body.extend_from_slice(body);
    }

    pub(crate) fn set_stream(&mut self, producer: StreamProducer) {
        self.body.clear();
        self.stream = Some(producer);
    }

    /// Buffer for appending; drops a pending stream.
    pub(crate) fn body_mut(&mut self) -> &mut Vec<u8> {
        self.stream = None;
        &mut self.body
    }

    pub(crate) fn reset(&mut self) {
        self.status = status::OK;
        self.headers.clear();
        self.body.clear();
        self.stream = None;
    }
}

/// Writer handed to streaming producers.
///
/// The first failed write marks the sink disconnected; later writes are
/// swallowed so a vanished peer never aborts the producer.
pub struct StreamSink<'w> {
    inner: &'w mut dyn Write,
    disconnected: bool,
    written: u64,
}

impl<'w> StreamSink<'w> {
    pub fn new(inner: &'w mut dyn Write) -> Self {
        Self {
            inner,
            disconnected: false,
            written: 0,
        }
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Writes a whole chunk, returning false once the peer is gone.
    pub fn send(&mut self, chunk: &[u8]) -> bool {
        if self.disconnected {
            return false;
        }
        if self.inner.write_all(chunk).is_err() {
            self.disconnected = true;
            return false;
        }
        self.written += chunk.len() as u64;
        true
    }
}

impl Write for StreamSink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.send(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.disconnected && self.inner.flush().is_err() {
            self.disconnected = true;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "response_test.rs"]
mod response_test;
