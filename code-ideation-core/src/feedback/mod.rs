// feedback module - parses streamed ideation reports into typed segments

pub mod parser;
pub mod segments;
pub mod stream;

pub use parser::{parse_feedback, parse_line_range, DEFAULT_DIAGRAM_TITLE};
pub use segments::{kind_counts, InteractiveSuggestion, LineRange, Segment, SegmentBody, Snippet};
pub use stream::{ReportBuffer, Utf8Chunker};
