// report parser - turns accumulated model output into display segments

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::segments::{InteractiveSuggestion, LineRange, Segment, SegmentBody, Snippet};

const FENCE: &str = "```";

const SUGGESTION_START: &str = "[[SUGGESTION_START]]";
const SUGGESTION_END: &str = "[[SUGGESTION_END]]";
const DIAGRAM_START: &str = "[[MERMAID_DIAGRAM_START]]";
const DIAGRAM_END: &str = "[[MERMAID_DIAGRAM_END]]";
const DIAGRAM_LANG: &str = "mermaid";

const FILE_PATH: &str = "FILE_PATH:";
const LINE_NUMBERS: &str = "LINE_NUMBERS:";
const TITLE: &str = "TITLE:";
const DESCRIPTION: &str = "DESCRIPTION:";
const ORIGINAL_SNIPPET: &str = "ORIGINAL_CODE_SNIPPET:";
const SUGGESTED_SNIPPET: &str = "SUGGESTED_CODE_SNIPPET:";

const DETECTED_LANGUAGE: &str = "Detected Language:";
const LANGUAGE_HINT: &str = "Language Hint Provided:";

/// title used when a diagram block has no TITLE line
pub const DEFAULT_DIAGRAM_TITLE: &str = "AI-Generated Diagram";

// longest marker first
const HEADINGS: [(&str, u8); 4] = [("#### ", 4), ("### ", 3), ("## ", 2), ("# ", 1)];

lazy_static! {
    static ref ORDERED_ITEM: Regex = Regex::new(r"^[0-9]+\.\s").unwrap();
    static ref LINE_SPAN: Regex =
        Regex::new(r"^LINE_NUMBERS:\s*([0-9]+)\s*-\s*([0-9]+)\s*$").unwrap();
    static ref LINE_SINGLE: Regex = Regex::new(r"^LINE_NUMBERS:\s*([0-9]+)\s*$").unwrap();
}

/// parse the full report text into an ordered list of segments
///
/// pure and total: the same text always yields the same segments, and
/// malformed or truncated blocks degrade instead of failing.
pub fn parse_feedback(text: &str) -> Vec<Segment> {
    FeedbackParser::new(text).run()
}

/// parse a `LINE_NUMBERS:` field line into a span
pub fn parse_line_range(line: &str) -> Option<LineRange> {
    if let Some(caps) = LINE_SPAN.captures(line) {
        let start = caps[1].parse::<u32>().ok()?;
        let end = caps[2].parse::<u32>().ok()?;
        return (start <= end).then_some(LineRange { start, end });
    }

    let caps = LINE_SINGLE.captures(line)?;
    let line_no = caps[1].parse::<u32>().ok()?;
    Some(LineRange {
        start: line_no,
        end: line_no,
    })
}

/// a fenced code block read from the line list
struct FencedBlock {
    code: String,
    lang: Option<String>,
    /// index of the first line after the closing fence
    next: usize,
}

impl FencedBlock {
    fn into_snippet(self) -> Snippet {
        Snippet {
            code: self.code,
            lang: self.lang,
        }
    }
}

/// read a fenced block opening at `start`, unterminated blocks run to the end
fn read_fence(lines: &[&str], start: usize) -> Option<FencedBlock> {
    let lang = lines.get(start)?.strip_prefix(FENCE)?.trim();

    let mut cursor = start + 1;
    let mut code = Vec::new();
    while let Some(line) = lines.get(cursor) {
        cursor += 1;
        if line.starts_with(FENCE) {
            break;
        }
        code.push(*line);
    }

    Some(FencedBlock {
        code: code.join("\n"),
        lang: (!lang.is_empty()).then(|| lang.to_string()),
        next: cursor,
    })
}

/// suggestion fields collected between the block markers
#[derive(Default)]
struct SuggestionDraft<'a> {
    title: Option<String>,
    description: Vec<&'a str>,
    file_path: Option<String>,
    line_range: Option<LineRange>,
    original_snippet: Option<Snippet>,
    suggested_snippet: Option<Snippet>,
}

impl SuggestionDraft<'_> {
    /// a suggestion needs a title and some description text
    ///
    /// description lines holding only whitespace do not count as text.
    fn finish(self) -> Option<InteractiveSuggestion> {
        let title = self.title.filter(|t| !t.is_empty())?;
        if !self.description.iter().any(|line| !line.trim().is_empty()) {
            return None;
        }

        Some(InteractiveSuggestion {
            title,
            description: self.description.join("\n"),
            file_path: self.file_path,
            line_range: self.line_range,
            original_snippet: self.original_snippet,
            suggested_snippet: self.suggested_snippet,
        })
    }
}

/// description text yields to any other field or the block terminator
fn ends_description(line: &str) -> bool {
    line.trim() == SUGGESTION_END
        || [ORIGINAL_SNIPPET, SUGGESTED_SNIPPET, FILE_PATH, LINE_NUMBERS, TITLE]
            .iter()
            .any(|prefix| line.starts_with(prefix))
}

struct FeedbackParser<'a> {
    lines: Vec<&'a str>,
    cursor: usize,
    segments: Vec<Segment>,
}

impl<'a> FeedbackParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.split('\n').collect(),
            cursor: 0,
            segments: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Segment> {
        while let Some(line) = self.lines.get(self.cursor).copied() {
            let trimmed = line.trim();

            if trimmed == SUGGESTION_START {
                self.suggestion_block();
                continue;
            }

            if trimmed == DIAGRAM_START {
                self.diagram_block(line);
                continue;
            }

            if let Some(block) = read_fence(&self.lines, self.cursor) {
                self.cursor = block.next;
                self.push(SegmentBody::Code {
                    content: block.code,
                    lang: block.lang,
                });
                continue;
            }

            if let Some(body) = self.line_segment(line) {
                self.push(body);
            }
            self.cursor += 1;
        }

        self.segments
    }

    fn push(&mut self, body: SegmentBody) {
        let id = self.segments.len();
        self.segments.push(Segment { id, body });
    }

    fn last_is_empty(&self) -> bool {
        self.segments
            .last()
            .is_some_and(|segment| segment.body.is_empty_line())
    }

    /// classify a single line outside any block, `None` for a collapsed blank
    fn line_segment(&self, line: &str) -> Option<SegmentBody> {
        let trimmed = line.trim();

        for (marker, level) in HEADINGS {
            if let Some(rest) = line.strip_prefix(marker) {
                return Some(SegmentBody::heading(level, rest));
            }
        }

        if let Some(rest) = line.strip_prefix("* ").or_else(|| line.strip_prefix("- ")) {
            return Some(SegmentBody::UnorderedItem {
                content: rest.to_string(),
            });
        }

        if let Some(marker) = ORDERED_ITEM.find(line) {
            return Some(SegmentBody::OrderedItem {
                content: line[marker.end()..].to_string(),
            });
        }

        if matches!(trimmed, "---" | "***" | "___") {
            return Some(SegmentBody::HorizontalRule);
        }

        if let Some(rest) = line.strip_prefix(DETECTED_LANGUAGE) {
            return Some(SegmentBody::DetectedLanguage {
                content: rest.trim().to_string(),
            });
        }

        if let Some(rest) = line.strip_prefix(LANGUAGE_HINT) {
            return Some(SegmentBody::DetectedLanguage {
                content: format!("Using Hint: {}", rest.trim()),
            });
        }

        if trimmed.is_empty() {
            return (!self.last_is_empty()).then_some(SegmentBody::Empty);
        }

        if line.len() > 4 && line.starts_with("**") && line.ends_with("**") {
            return Some(SegmentBody::StrongEmphasis {
                content: line[2..line.len() - 2].to_string(),
            });
        }

        Some(SegmentBody::paragraph(line))
    }

    /// consume `[[SUGGESTION_START]]` through its end marker (or end of input)
    fn suggestion_block(&mut self) {
        let block_start = self.cursor;
        let mut draft = SuggestionDraft::default();
        let mut cursor = self.cursor + 1;

        while let Some(line) = self.lines.get(cursor).copied() {
            if line.trim() == SUGGESTION_END {
                break;
            }

            if let Some(rest) = line.strip_prefix(FILE_PATH) {
                let path = rest.trim();
                draft.file_path = (!path.is_empty()).then(|| path.to_string());
            } else if line.starts_with(LINE_NUMBERS) {
                draft.line_range = parse_line_range(line);
            } else if let Some(rest) = line.strip_prefix(TITLE) {
                draft.title = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix(DESCRIPTION) {
                let first = rest.trim();
                if !first.is_empty() {
                    draft.description.push(first);
                }
                while let Some(next) = self.lines.get(cursor + 1).copied() {
                    if ends_description(next) {
                        break;
                    }
                    cursor += 1;
                    draft.description.push(next);
                }
            } else if line.starts_with(ORIGINAL_SNIPPET) {
                if let Some(block) = read_fence(&self.lines, cursor + 1) {
                    cursor = block.next - 1;
                    draft.original_snippet = Some(block.into_snippet());
                }
            } else if line.starts_with(SUGGESTED_SNIPPET) {
                if let Some(block) = read_fence(&self.lines, cursor + 1) {
                    cursor = block.next - 1;
                    draft.suggested_snippet = Some(block.into_snippet());
                }
            }
            cursor += 1;
        }

        // step past the end marker
        self.cursor = cursor + 1;

        match draft.finish() {
            Some(suggestion) => self.push(SegmentBody::Suggestion(suggestion)),
            None => debug!("dropping incomplete suggestion block at line {}", block_start + 1),
        }
    }

    /// consume a diagram block, or emit the marker as a paragraph when malformed
    fn diagram_block(&mut self, marker_line: &'a str) {
        let mut cursor = self.cursor + 1;
        let mut title = DEFAULT_DIAGRAM_TITLE.to_string();

        if let Some(rest) = self.lines.get(cursor).and_then(|line| line.strip_prefix(TITLE)) {
            title = rest.trim().to_string();
            cursor += 1;
        }

        match read_fence(&self.lines, cursor) {
            Some(block) if block.lang.as_deref() == Some(DIAGRAM_LANG) => {
                // tolerate stray lines between the fence and the end marker
                let end_marker = self.lines[block.next..]
                    .iter()
                    .position(|line| line.trim() == DIAGRAM_END);
                self.cursor = match end_marker {
                    Some(offset) => block.next + offset + 1,
                    None => block.next,
                };
                self.push(SegmentBody::Diagram {
                    title,
                    source: block.code,
                });
            }
            _ => {
                debug!(
                    "diagram block at line {} has no mermaid fence, keeping marker as text",
                    self.cursor + 1
                );
                self.push(SegmentBody::paragraph(marker_line));
                self.cursor += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bodies(text: &str) -> Vec<SegmentBody> {
        parse_feedback(text).into_iter().map(|s| s.body).collect()
    }

    fn only_suggestion(text: &str) -> InteractiveSuggestion {
        match bodies(text).as_slice() {
            [SegmentBody::Suggestion(s)] => s.clone(),
            other => panic!("expected one suggestion, got {other:?}"),
        }
    }

    #[test]
    fn heading_blank_paragraph() {
        assert_eq!(
            bodies("# Title\n\nSome text"),
            vec![
                SegmentBody::heading(1, "Title"),
                SegmentBody::Empty,
                SegmentBody::paragraph("Some text"),
            ]
        );
    }

    #[test]
    fn heading_levels_use_longest_marker() {
        assert_eq!(
            bodies("## Two\n### Three\n#### Four\n##### Five"),
            vec![
                SegmentBody::heading(2, "Two"),
                SegmentBody::heading(3, "Three"),
                SegmentBody::heading(4, "Four"),
                SegmentBody::paragraph("##### Five"),
            ]
        );
    }

    #[test]
    fn consecutive_blank_lines_collapse() {
        assert_eq!(
            bodies("a\n\n\nb"),
            vec![
                SegmentBody::paragraph("a"),
                SegmentBody::Empty,
                SegmentBody::paragraph("b"),
            ]
        );
        assert_eq!(bodies("  \n\t\n"), vec![SegmentBody::Empty]);
    }

    #[test]
    fn list_items() {
        assert_eq!(
            bodies("* star\n- dash\n12. twelve\n3.no space"),
            vec![
                SegmentBody::UnorderedItem {
                    content: "star".into()
                },
                SegmentBody::UnorderedItem {
                    content: "dash".into()
                },
                SegmentBody::OrderedItem {
                    content: "twelve".into()
                },
                SegmentBody::paragraph("3.no space"),
            ]
        );
    }

    #[test]
    fn rules_language_and_emphasis() {
        assert_eq!(
            bodies(" --- \n***\n___\nDetected Language:  Rust \nLanguage Hint Provided: go\n**Key point**\n****"),
            vec![
                SegmentBody::HorizontalRule,
                SegmentBody::HorizontalRule,
                SegmentBody::HorizontalRule,
                SegmentBody::DetectedLanguage {
                    content: "Rust".into()
                },
                SegmentBody::DetectedLanguage {
                    content: "Using Hint: go".into()
                },
                SegmentBody::StrongEmphasis {
                    content: "Key point".into()
                },
                SegmentBody::paragraph("****"),
            ]
        );
    }

    #[test]
    fn fenced_code_with_and_without_language() {
        assert_eq!(
            bodies("```rust\nfn main() {}\n```\n```\nplain\n```"),
            vec![
                SegmentBody::Code {
                    content: "fn main() {}".into(),
                    lang: Some("rust".into())
                },
                SegmentBody::Code {
                    content: "plain".into(),
                    lang: None
                },
            ]
        );
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        assert_eq!(
            bodies("```py\nx = 1\n# not a heading"),
            vec![SegmentBody::Code {
                content: "x = 1\n# not a heading".into(),
                lang: Some("py".into())
            }]
        );
    }

    #[test]
    fn minimal_suggestion() {
        let s = only_suggestion(
            "[[SUGGESTION_START]]\nTITLE: Fix loop\nDESCRIPTION: Use a map instead\n[[SUGGESTION_END]]",
        );
        assert_eq!(s.title, "Fix loop");
        assert_eq!(s.description, "Use a map instead");
        assert_eq!(s.file_path, None);
        assert_eq!(s.line_range, None);
    }

    #[test]
    fn full_suggestion_block() {
        let text = "\
[[SUGGESTION_START]]
FILE_PATH: src/app.ts
LINE_NUMBERS: 10-15
TITLE: Cache lookups
DESCRIPTION: The loop rebuilds the index.
- every iteration
ORIGINAL_CODE_SNIPPET:
```ts
for (const x of xs) build();
```
SUGGESTED_CODE_SNIPPET:
```ts
const idx = build();
```
[[SUGGESTION_END]]
after";
        let segments = parse_feedback(text);
        assert_eq!(segments.len(), 2);
        let SegmentBody::Suggestion(s) = &segments[0].body else {
            panic!("expected suggestion, got {:?}", segments[0].body);
        };
        assert_eq!(s.title, "Cache lookups");
        assert_eq!(s.description, "The loop rebuilds the index.\n- every iteration");
        assert_eq!(s.file_path.as_deref(), Some("src/app.ts"));
        assert_eq!(s.line_range, Some(LineRange { start: 10, end: 15 }));
        assert_eq!(
            s.original_snippet,
            Some(Snippet {
                code: "for (const x of xs) build();".into(),
                lang: Some("ts".into())
            })
        );
        assert_eq!(
            s.suggested_snippet,
            Some(Snippet {
                code: "const idx = build();".into(),
                lang: Some("ts".into())
            })
        );
        assert_eq!(segments[1].body, SegmentBody::paragraph("after"));
    }

    #[test]
    fn description_yields_to_later_title() {
        let s = only_suggestion(
            "[[SUGGESTION_START]]\nDESCRIPTION: first\nsecond\n\nTITLE: Late title\n[[SUGGESTION_END]]",
        );
        assert_eq!(s.title, "Late title");
        assert_eq!(s.description, "first\nsecond\n");
    }

    #[test]
    fn description_yields_to_location_fields() {
        let s = only_suggestion(
            "[[SUGGESTION_START]]\nTITLE: T\nDESCRIPTION: one\ntwo\nFILE_PATH: src/a.rs\nLINE_NUMBERS: 4-5\n[[SUGGESTION_END]]",
        );
        assert_eq!(s.description, "one\ntwo");
        assert_eq!(s.file_path.as_deref(), Some("src/a.rs"));
        assert_eq!(s.line_range, Some(LineRange { start: 4, end: 5 }));

        let s = only_suggestion(
            "[[SUGGESTION_START]]\nTITLE: T\nDESCRIPTION: kept\nLINE_NUMBERS: 7\n[[SUGGESTION_END]]",
        );
        assert_eq!(s.description, "kept");
        assert_eq!(s.line_range, Some(LineRange { start: 7, end: 7 }));
    }

    #[test]
    fn description_may_start_on_next_line() {
        let s = only_suggestion(
            "[[SUGGESTION_START]]\nTITLE: T\nDESCRIPTION:\nbody text\n[[SUGGESTION_END]]",
        );
        assert_eq!(s.description, "body text");
    }

    #[test]
    fn snippet_without_fence_is_absent() {
        let s = only_suggestion(
            "[[SUGGESTION_START]]\nTITLE: T\nORIGINAL_CODE_SNIPPET:\nDESCRIPTION: d\n[[SUGGESTION_END]]",
        );
        assert_eq!(s.original_snippet, None);
        assert_eq!(s.description, "d");
    }

    #[test]
    fn suggestion_without_title_is_dropped() {
        assert!(bodies("[[SUGGESTION_START]]\nDESCRIPTION: no title here\n[[SUGGESTION_END]]").is_empty());
        assert!(bodies("[[SUGGESTION_START]]\nTITLE:   \nDESCRIPTION: d\n[[SUGGESTION_END]]").is_empty());
    }

    #[test]
    fn suggestion_without_description_text_is_dropped() {
        assert!(bodies("[[SUGGESTION_START]]\nTITLE: T\n[[SUGGESTION_END]]").is_empty());
        assert!(bodies("[[SUGGESTION_START]]\nTITLE: T\nDESCRIPTION:\n   \n[[SUGGESTION_END]]").is_empty());
    }

    #[test]
    fn truncated_suggestion_consumes_rest_of_input() {
        // still streaming: no end marker yet
        assert!(bodies("intro\n[[SUGGESTION_START]]\nTITLE: Half").len() == 1);
        let s = only_suggestion("[[SUGGESTION_START]]\nTITLE: T\nDESCRIPTION: partial");
        assert_eq!(s.description, "partial");
    }

    #[test]
    fn suggestion_markers_tolerate_surrounding_whitespace() {
        let s = only_suggestion("  [[SUGGESTION_START]]  \nTITLE: T\nDESCRIPTION: d\n [[SUGGESTION_END]]");
        assert_eq!(s.title, "T");
    }

    #[test]
    fn line_range_parsing() {
        assert_eq!(
            parse_line_range("LINE_NUMBERS: 3-7"),
            Some(LineRange { start: 3, end: 7 })
        );
        assert_eq!(
            parse_line_range("LINE_NUMBERS:  4 - 9  "),
            Some(LineRange { start: 4, end: 9 })
        );
        assert_eq!(
            parse_line_range("LINE_NUMBERS: 23"),
            Some(LineRange { start: 23, end: 23 })
        );
        assert_eq!(parse_line_range("LINE_NUMBERS: 9-3"), None);
        assert_eq!(parse_line_range("LINE_NUMBERS: ten"), None);
        assert_eq!(parse_line_range("LINE_NUMBERS: 99999999999-99999999999"), None);
    }

    #[test]
    fn later_invalid_line_numbers_clear_the_range() {
        let s = only_suggestion(
            "[[SUGGESTION_START]]\nLINE_NUMBERS: 1-2\nLINE_NUMBERS: oops\nTITLE: T\nDESCRIPTION: d\n[[SUGGESTION_END]]",
        );
        assert_eq!(s.line_range, None);
    }

    #[test]
    fn diagram_block() {
        assert_eq!(
            bodies("[[MERMAID_DIAGRAM_START]]\nTITLE: Flow\n```mermaid\nA-->B\n```\n[[MERMAID_DIAGRAM_END]]"),
            vec![SegmentBody::Diagram {
                title: "Flow".into(),
                source: "A-->B".into()
            }]
        );
    }

    #[test]
    fn diagram_default_title_and_stray_lines() {
        assert_eq!(
            bodies("[[MERMAID_DIAGRAM_START]]\n```mermaid\ngraph TD\nA-->B\n```\nstray\n[[MERMAID_DIAGRAM_END]]\nnext"),
            vec![
                SegmentBody::Diagram {
                    title: DEFAULT_DIAGRAM_TITLE.into(),
                    source: "graph TD\nA-->B".into()
                },
                SegmentBody::paragraph("next"),
            ]
        );
    }

    #[test]
    fn diagram_without_end_marker_resumes_after_fence() {
        assert_eq!(
            bodies("[[MERMAID_DIAGRAM_START]]\n```mermaid\nA-->B\n```\nafter"),
            vec![
                SegmentBody::Diagram {
                    title: DEFAULT_DIAGRAM_TITLE.into(),
                    source: "A-->B".into()
                },
                SegmentBody::paragraph("after"),
            ]
        );
    }

    #[test]
    fn diagram_without_mermaid_fence_degrades_to_paragraph() {
        assert_eq!(
            bodies("[[MERMAID_DIAGRAM_START]]\nTITLE: T\n```js\nx\n```"),
            vec![
                SegmentBody::paragraph("[[MERMAID_DIAGRAM_START]]"),
                SegmentBody::paragraph("TITLE: T"),
                SegmentBody::Code {
                    content: "x".into(),
                    lang: Some("js".into())
                },
            ]
        );
    }

    #[test]
    fn ids_are_sequential() {
        let segments = parse_feedback("# a\nb\n\n\nc");
        let ids: Vec<usize> = segments.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(segments[3].key(), "segment-3");
    }

    #[test]
    fn empty_input_is_one_empty_segment() {
        assert_eq!(bodies(""), vec![SegmentBody::Empty]);
    }
}
