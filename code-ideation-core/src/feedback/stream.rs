// stream module - accumulates report chunks and re-derives segments

use super::parser::parse_feedback;
use super::segments::Segment;

/// accumulated report text plus the segments parsed from all of it
///
/// every push re-parses the whole text; segment lists are replaced wholesale.
#[derive(Debug, Default)]
pub struct ReportBuffer {
    text: String,
    segments: Vec<Segment>,
    updates: usize,
}

impl ReportBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// append a chunk and return the freshly parsed segments
    pub fn push_str(&mut self, chunk: &str) -> &[Segment] {
        self.text.push_str(chunk);
        self.segments = parse_feedback(&self.text);
        self.updates += 1;
        &self.segments
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// number of chunks pushed since the last clear
    pub fn updates(&self) -> usize {
        self.updates
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.segments.clear();
        self.updates = 0;
    }
}

/// decodes raw byte chunks as utf-8, holding back a split trailing sequence
#[derive(Debug, Default)]
pub struct Utf8Chunker {
    pending: Vec<u8>,
}

impl Utf8Chunker {
    pub fn new() -> Self {
        Self::default()
    }

    /// decode as much of the buffered input as is complete
    ///
    /// invalid sequences become U+FFFD, an incomplete tail waits for more bytes.
    pub fn feed(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();

        loop {
            let (valid, invalid_len) = match std::str::from_utf8(&self.pending) {
                Ok(_) => (self.pending.len(), None),
                Err(e) => (e.valid_up_to(), e.error_len()),
            };
            out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));

            match invalid_len {
                Some(len) => {
                    out.push(char::REPLACEMENT_CHARACTER);
                    self.pending.drain(..valid + len);
                }
                None => {
                    self.pending.drain(..valid);
                    break;
                }
            }
        }

        out
    }

    /// flush whatever is left at end of input
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}
