//! Frame splitting for the event stream.
//!
//! The pipeline writes `data: <json>\n\n` records onto a plain HTTP body, so
//! chunk boundaries are decided by the network and carry no meaning. The
//! splitter buffers raw bytes and cuts a frame at every `\n\n`.
//!
//! Bytes are buffered undecoded and each frame is decoded only once it is
//! complete. The delimiter is ASCII, so a frame boundary can never fall inside
//! a multi-byte UTF-8 sequence, and a character split across two chunks is
//! reassembled before decoding.
//!
//! # Truncated tails
//!
//! Bytes still buffered when the stream ends were never terminated by a
//! delimiter. [`FrameSplitter::finish`] discards them: a stream that stops
//! mid-frame yields nothing for that partial frame.

use bytes::{Buf, BytesMut};

/// Frame delimiter on the wire.
pub const FRAME_DELIMITER: &[u8] = b"\n\n";

/// Prefix that marks a frame as carrying an event payload.
pub const DATA_PREFIX: &str = "data: ";

/// One delimiter-terminated unit of the event stream, without its delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    text: String,
}

impl Frame {
    /// Build a frame from already-decoded text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Full frame text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text after the `data: ` prefix, if the frame has one.
    pub fn payload(&self) -> Option<&str> {
        self.text.strip_prefix(DATA_PREFIX)
    }

    /// Whether the frame carries an event payload.
    pub fn is_data(&self) -> bool {
        self.payload().is_some()
    }
}

/// Incremental splitter turning arbitrary chunks into complete frames.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    buffer: BytesMut,
    /// Offset from which the next delimiter search starts. Everything before
    /// it is known not to contain a delimiter.
    scan_from: usize,
}

impl FrameSplitter {
    /// Create an empty splitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every frame it completes.
    ///
    /// Any unterminated remainder stays buffered for the next call.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(end) = self.find_delimiter() {
            let raw = self.buffer.split_to(end);
            self.buffer.advance(FRAME_DELIMITER.len());
            self.scan_from = 0;
            frames.push(Frame::new(String::from_utf8_lossy(&raw).into_owned()));
        }

        // The last byte may be the first half of a delimiter.
        self.scan_from = self.buffer.len().saturating_sub(FRAME_DELIMITER.len() - 1);
        frames
    }

    /// Signal end of stream.
    ///
    /// Complete frames have all been returned by [`feed`](Self::feed) already,
    /// so this only deals with the undelimited tail, which is dropped. The
    /// returned list is therefore always empty.
    pub fn finish(&mut self) -> Vec<Frame> {
        if !self.buffer.is_empty() {
            tracing::debug!(
                "Discarding {} undelimited bytes at end of stream",
                self.buffer.len()
            );
        }
        self.reset();
        Vec::new()
    }

    /// Number of buffered bytes not yet terminated by a delimiter.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drop all buffered state.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.scan_from = 0;
    }

    fn find_delimiter(&self) -> Option<usize> {
        let start = self.scan_from.min(self.buffer.len());
        self.buffer[start..]
            .windows(FRAME_DELIMITER.len())
            .position(|window| window == FRAME_DELIMITER)
            .map(|pos| start + pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(frames: &[Frame]) -> Vec<&str> {
        frames.iter().map(Frame::text).collect()
    }

    #[test]
    fn test_single_chunk_multiple_frames() {
        let mut splitter = FrameSplitter::new();
        let frames = splitter.feed(b"data: a\n\ndata: b\n\n");
        assert_eq!(texts(&frames), vec!["data: a", "data: b"]);
        assert_eq!(splitter.pending_len(), 0);
    }

    #[test]
    fn test_remainder_carried_to_next_feed() {
        let mut splitter = FrameSplitter::new();
        assert!(splitter.feed(b"data: {\"phase\":\"lo").is_empty());
        assert_eq!(splitter.pending_len(), 18);

        let frames = splitter.feed(b"g\"}\n\ndata: x");
        assert_eq!(texts(&frames), vec!["data: {\"phase\":\"log\"}"]);
        assert_eq!(splitter.pending_len(), 7);
    }

    #[test]
    fn test_delimiter_split_across_chunks() {
        let mut splitter = FrameSplitter::new();
        assert!(splitter.feed(b"data: a\n").is_empty());
        let frames = splitter.feed(b"\ndata: b\n");
        assert_eq!(texts(&frames), vec!["data: a"]);
        let frames = splitter.feed(b"\n");
        assert_eq!(texts(&frames), vec!["data: b"]);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let text = "data: 核心初始化\n\n".as_bytes();
        let mut splitter = FrameSplitter::new();
        let mut frames = Vec::new();
        // Split in the middle of the first three-byte character.
        frames.extend(splitter.feed(&text[..7]));
        frames.extend(splitter.feed(&text[7..]));
        assert_eq!(texts(&frames), vec!["data: 核心初始化"]);
    }

    #[test]
    fn test_consecutive_delimiters_yield_empty_frame() {
        let mut splitter = FrameSplitter::new();
        let frames = splitter.feed(b"data: a\n\n\n\n");
        assert_eq!(texts(&frames), vec!["data: a", ""]);
    }

    #[test]
    fn test_finish_discards_unterminated_tail() {
        let mut splitter = FrameSplitter::new();
        assert!(splitter.feed(b"data: {\"phase\":\"log\"").is_empty());
        assert!(splitter.pending_len() > 0);

        assert!(splitter.finish().is_empty());
        assert_eq!(splitter.pending_len(), 0);
    }

    #[test]
    fn test_finish_on_clean_boundary() {
        let mut splitter = FrameSplitter::new();
        assert_eq!(splitter.feed(b"data: a\n\n").len(), 1);
        assert!(splitter.finish().is_empty());
    }

    #[test]
    fn test_frame_payload() {
        assert_eq!(Frame::new("data: {}").payload(), Some("{}"));
        assert_eq!(Frame::new(": keep-alive").payload(), None);
        // The prefix includes the space.
        assert_eq!(Frame::new("data:{}").payload(), None);
        assert!(!Frame::new("").is_data());
    }
}
