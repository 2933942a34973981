// terminal rendering module - draws parsed report segments with console styling

use console::style;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::excerpt::{excerpt, ExcerptOutcome, DEFAULT_CONTEXT_LINES};
use crate::feedback::{InteractiveSuggestion, Segment, SegmentBody, Snippet};
use crate::source::AnalysisSource;

lazy_static! {
    static ref INLINE_CODE: Regex = Regex::new(r"`([^`]+)`").unwrap();
    static ref BOLD: Regex = Regex::new(r"\*\*(.*?)\*\*|__(.*?)__").unwrap();
    static ref ITALIC: Regex = Regex::new(r"\*(.*?)\*|_(.*?)_").unwrap();
    static ref LINK: Regex = Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap();
}

const RULE_WIDTH: usize = 48;

/// what the renderer needs besides the segments
pub struct RenderOptions<'a> {
    /// analysed code, used to show excerpts for suggestions with line numbers
    pub source: Option<&'a AnalysisSource>,
    pub context_lines: usize,
}

impl Default for RenderOptions<'_> {
    fn default() -> Self {
        Self {
            source: None,
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

/// render every segment to a printable string
pub fn render_segments(segments: &[Segment], options: &RenderOptions) -> String {
    let mut out = Vec::new();
    let mut ordinal = 0;

    for segment in segments {
        // ordered items number themselves within a consecutive run
        ordinal = match segment.body {
            SegmentBody::OrderedItem { .. } => ordinal + 1,
            _ => 0,
        };
        out.push(render_segment(&segment.body, ordinal, options));
    }

    out.join("\n")
}

fn render_segment(body: &SegmentBody, ordinal: usize, options: &RenderOptions) -> String {
    match body {
        SegmentBody::Heading { level: 1, content } => {
            let underline = "═".repeat(content.chars().count().max(3));
            format!(
                "\n{}\n{}",
                style(content).cyan().bold(),
                style(underline).cyan().dim()
            )
        }
        SegmentBody::Heading { level: 2, content } => format!("\n{}", style(content).cyan().bold()),
        SegmentBody::Heading { level: 3, content } => format!("{}", style(content).blue().bold()),
        SegmentBody::Heading { content, .. } => format!("{}", style(content).green().bold()),
        SegmentBody::Paragraph { content } => render_inline(content),
        SegmentBody::UnorderedItem { content } => format!("  • {}", render_inline(content)),
        SegmentBody::OrderedItem { content } => format!("  {ordinal}. {}", render_inline(content)),
        SegmentBody::Empty => String::new(),
        SegmentBody::HorizontalRule => format!("{}", style("─".repeat(RULE_WIDTH)).dim()),
        SegmentBody::DetectedLanguage { content } => format!(
            "{} {}",
            style("🌐 language(s):").cyan().bold(),
            style(content).cyan()
        ),
        SegmentBody::StrongEmphasis { content } => {
            format!("{}", style(render_inline(content)).cyan().bold())
        }
        SegmentBody::Code { content, lang } => code_block(lang.as_deref(), content),
        SegmentBody::Suggestion(suggestion) => suggestion_card(suggestion, options),
        SegmentBody::Diagram { title, source } => format!(
            "{}\n{}",
            style(format!("◆ {title}")).magenta().bold(),
            code_block(Some("mermaid"), source)
        ),
    }
}

/// boxed code listing with a language label
fn code_block(lang: Option<&str>, code: &str) -> String {
    let mut lines = vec![format!(
        "{}",
        style(format!("┌─ {}", lang.unwrap_or("text"))).dim()
    )];
    for line in code.split('\n') {
        lines.push(format!("{} {}", style("│").dim(), line));
    }
    lines.push(format!("{}", style("└─").dim()));
    lines.join("\n")
}

fn suggestion_card(suggestion: &InteractiveSuggestion, options: &RenderOptions) -> String {
    let mut lines = vec![format!(
        "{} {}",
        style("💡").cyan(),
        style(&suggestion.title).cyan().bold()
    )];

    if let (Some(range), Some(source)) = (suggestion.line_range, options.source) {
        let outcome = excerpt(
            source,
            suggestion.file_path.as_deref(),
            range,
            options.context_lines,
        );
        if let Some(rendered) = render_excerpt(&outcome) {
            lines.push(rendered);
        }
    }

    for line in suggestion.description.split('\n') {
        lines.push(render_inline(line));
    }

    if let Some(snippet) = &suggestion.original_snippet {
        lines.push(format!("{}", style("original code (from ai):").yellow()));
        lines.push(snippet_block(snippet));
    }
    if let Some(snippet) = &suggestion.suggested_snippet {
        lines.push(format!("{}", style("suggested code:").green()));
        lines.push(snippet_block(snippet));
    }

    lines.join("\n")
}

fn snippet_block(snippet: &Snippet) -> String {
    code_block(snippet.lang.as_deref(), &snippet.code)
}

fn render_excerpt(outcome: &ExcerptOutcome) -> Option<String> {
    match outcome {
        ExcerptOutcome::Skipped => None,
        ExcerptOutcome::FileNotFound => Some(format!(
            "{}",
            style("could not find the specified file content for excerpt.").dim().italic()
        )),
        ExcerptOutcome::Empty => Some(format!(
            "{}",
            style("could not extract relevant code lines.").dim().italic()
        )),
        ExcerptOutcome::Lines(excerpt) => {
            let mut lines = vec![format!("{}", style(excerpt.title()).yellow().bold())];
            for line in &excerpt.lines {
                let number = format!("{:>4}", line.number);
                if line.highlighted {
                    lines.push(format!(
                        "{} {} {}",
                        style("▶").cyan(),
                        style(number).cyan(),
                        line.text
                    ));
                } else {
                    lines.push(format!("  {} {}", style(number).dim(), style(&line.text).dim()));
                }
            }
            Some(lines.join("\n"))
        }
    }
}

/// style inline markdown: code spans, bold, italic and links
///
/// text inside code spans is left alone.
pub fn render_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in INLINE_CODE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&style_prose(&text[last..whole.start()]));
        out.push_str(&format!("{}", style(&caps[1]).yellow()));
        last = whole.end();
    }
    out.push_str(&style_prose(&text[last..]));
    out
}

/// style links, then emphasis in the text between them
fn style_prose(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in LINK.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&style_emphasis(&text[last..whole.start()]));
        out.push_str(&format!(
            "{} ({})",
            style(&caps[1]).blue().underlined(),
            style(&caps[2]).dim()
        ));
        last = whole.end();
    }
    out.push_str(&style_emphasis(&text[last..]));
    out
}

fn style_emphasis(text: &str) -> String {
    let text = BOLD.replace_all(text, |caps: &Captures| {
        format!("{}", style(either_group(caps)).bold())
    });
    let text = ITALIC.replace_all(&text, |caps: &Captures| {
        format!("{}", style(either_group(caps)).italic())
    });
    text.into_owned()
}

/// content of whichever alternative matched
fn either_group(caps: &Captures) -> String {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
