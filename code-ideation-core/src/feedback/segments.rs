// segment types - the renderable units of a parsed ideation report

use serde::Serialize;

/// one positional unit of a parsed report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub id: usize,
    #[serde(flatten)]
    pub body: SegmentBody,
}

impl Segment {
    /// stable display key derived from the segment's position
    pub fn key(&self) -> String {
        format!("segment-{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentBody {
    Heading {
        level: u8,
        content: String,
    },
    UnorderedItem {
        content: String,
    },
    OrderedItem {
        content: String,
    },
    Paragraph {
        content: String,
    },
    Empty,
    HorizontalRule,
    DetectedLanguage {
        content: String,
    },
    StrongEmphasis {
        content: String,
    },
    Code {
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
    },
    Suggestion(InteractiveSuggestion),
    Diagram {
        title: String,
        source: String,
    },
}

impl SegmentBody {
    pub fn paragraph(content: impl Into<String>) -> Self {
        Self::Paragraph {
            content: content.into(),
        }
    }

    pub fn heading(level: u8, content: impl Into<String>) -> Self {
        Self::Heading {
            level,
            content: content.into(),
        }
    }

    pub fn is_empty_line(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// short label for the segment's kind, shown in verbose summaries
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Heading { level: 1, .. } => "heading1",
            Self::Heading { level: 2, .. } => "heading2",
            Self::Heading { level: 3, .. } => "heading3",
            Self::Heading { .. } => "heading4",
            Self::UnorderedItem { .. } => "listitem_ul",
            Self::OrderedItem { .. } => "listitem_ol",
            Self::Paragraph { .. } => "paragraph",
            Self::Empty => "empty",
            Self::HorizontalRule => "horizontal_rule",
            Self::DetectedLanguage { .. } => "detected_language",
            Self::StrongEmphasis { .. } => "strong_emphasis",
            Self::Code { .. } => "code",
            Self::Suggestion(_) => "interactive_suggestion",
            Self::Diagram { .. } => "mermaid_diagram",
        }
    }
}

/// an actionable code-change recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractiveSuggestion {
    pub title: String,
    /// markdown text
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_range: Option<LineRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_snippet: Option<Snippet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_snippet: Option<Snippet>,
}

/// 1-based inclusive line span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

/// count segments per kind, in order of first appearance
pub fn kind_counts(segments: &[Segment]) -> Vec<(&'static str, usize)> {
    let mut counts: Vec<(&'static str, usize)> = Vec::new();
    for segment in segments {
        let kind = segment.body.kind_name();
        match counts.iter_mut().find(|(name, _)| *name == kind) {
            Some((_, count)) => *count += 1,
            None => counts.push((kind, 1)),
        }
    }
    counts
}
