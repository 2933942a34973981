// excerpt module - pulls the lines a suggestion points at out of the analysed source

use crate::feedback::LineRange;
use crate::source::AnalysisSource;

/// lines shown around the highlighted range by default
pub const DEFAULT_CONTEXT_LINES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcerptLine {
    /// 1-based line number in the source
    pub number: usize,
    pub text: String,
    /// true inside the suggestion's line range
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excerpt {
    pub file_path: Option<String>,
    pub range: LineRange,
    pub lines: Vec<ExcerptLine>,
}

impl Excerpt {
    /// header text, shortening long paths to their tail
    pub fn title(&self) -> String {
        let LineRange { start, end } = self.range;
        let Some(path) = &self.file_path else {
            return format!("Original Code (Lines {start}-{end})");
        };

        let title = format!("Original Code ({path}, Lines {start}-{end})");
        if title.chars().count() <= 80 {
            return title;
        }

        let chars: Vec<char> = path.chars().collect();
        let tail: String = chars[chars.len().saturating_sub(30)..].iter().collect();
        format!("Original Code (...{tail}, Lines {start}-{end})")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExcerptOutcome {
    /// range is unusable (zero start or reversed)
    Skipped,
    /// the referenced file is not part of the analysed source
    FileNotFound,
    /// the window around the range holds no lines
    Empty,
    Lines(Excerpt),
}

/// cut the lines of `range` (plus context) out of the analysed source
///
/// snippets ignore `target_path`. for file sets a missing target selects the
/// first file.
pub fn excerpt(
    source: &AnalysisSource,
    target_path: Option<&str>,
    range: LineRange,
    context_lines: usize,
) -> ExcerptOutcome {
    if range.start == 0 || range.end < range.start {
        return ExcerptOutcome::Skipped;
    }

    let (content, file_path) = match source {
        AnalysisSource::Snippet(code) => (code.as_str(), None),
        AnalysisSource::Files(files) => {
            let found = match target_path {
                Some(path) => files.iter().find(|f| f.path == path),
                None => files.first(),
            };
            match found {
                Some(file) => (file.content.as_str(), Some(file.path.clone())),
                None => return ExcerptOutcome::FileNotFound,
            }
        }
    };

    let start = range.start as usize;
    let end = range.end as usize;
    let lines: Vec<&str> = content.split('\n').collect();
    let first = start.saturating_sub(1 + context_lines);
    let last = (end + context_lines).min(lines.len());

    if first >= last {
        return ExcerptOutcome::Empty;
    }

    let lines = lines[first..last]
        .iter()
        .enumerate()
        .map(|(offset, text)| {
            let number = first + 1 + offset;
            ExcerptLine {
                number,
                text: text.to_string(),
                highlighted: (start..=end).contains(&number),
            }
        })
        .collect();

    ExcerptOutcome::Lines(Excerpt {
        file_path,
        range,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceFile;

    fn numbered(count: usize) -> String {
        (1..=count).map(|n| format!("line {n}")).collect::<Vec<_>>().join("\n")
    }

    fn files() -> AnalysisSource {
        AnalysisSource::Files(vec![
            SourceFile {
                name: "a.rs".into(),
                path: "src/a.rs".into(),
                content: numbered(3),
            },
            SourceFile {
                name: "b.rs".into(),
                path: "src/b.rs".into(),
                content: numbered(20),
            },
        ])
    }

    #[test]
    fn window_includes_context_and_highlights_range() {
        let outcome = excerpt(&files(), Some("src/b.rs"), LineRange { start: 5, end: 6 }, 2);
        let ExcerptOutcome::Lines(excerpt) = outcome else {
            panic!("expected lines, got {outcome:?}");
        };
        let numbers: Vec<usize> = excerpt.lines.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![3, 4, 5, 6, 7, 8]);
        let highlighted: Vec<usize> = excerpt
            .lines
            .iter()
            .filter(|l| l.highlighted)
            .map(|l| l.number)
            .collect();
        assert_eq!(highlighted, vec![5, 6]);
        assert_eq!(excerpt.lines[2].text, "line 5");
        assert_eq!(excerpt.title(), "Original Code (src/b.rs, Lines 5-6)");
    }

    #[test]
    fn window_is_clamped_to_file() {
        let outcome = excerpt(&files(), None, LineRange { start: 1, end: 3 }, 2);
        let ExcerptOutcome::Lines(excerpt) = outcome else {
            panic!("expected lines, got {outcome:?}");
        };
        assert_eq!(excerpt.file_path.as_deref(), Some("src/a.rs"));
        assert_eq!(excerpt.lines.len(), 3);
    }

    #[test]
    fn snippet_has_no_path() {
        let source = AnalysisSource::Snippet(numbered(4));
        let outcome = excerpt(&source, Some("ignored.rs"), LineRange { start: 2, end: 2 }, 0);
        let ExcerptOutcome::Lines(excerpt) = outcome else {
            panic!("expected lines, got {outcome:?}");
        };
        assert_eq!(excerpt.title(), "Original Code (Lines 2-2)");
        assert_eq!(excerpt.lines.len(), 1);
    }

    #[test]
    fn unusable_ranges_and_missing_files() {
        let source = files();
        assert_eq!(
            excerpt(&source, None, LineRange { start: 0, end: 2 }, 2),
            ExcerptOutcome::Skipped
        );
        assert_eq!(
            excerpt(&source, Some("nope.rs"), LineRange { start: 1, end: 1 }, 2),
            ExcerptOutcome::FileNotFound
        );
        assert_eq!(
            excerpt(&source, Some("src/a.rs"), LineRange { start: 50, end: 60 }, 2),
            ExcerptOutcome::Empty
        );
    }

    #[test]
    fn long_paths_are_shortened_in_title() {
        let excerpt = Excerpt {
            file_path: Some(format!("{}/deep/module/file.rs", "very/long/directory".repeat(4))),
            range: LineRange { start: 1, end: 2 },
            lines: Vec::new(),
        };
        let title = excerpt.title();
        assert!(title.starts_with("Original Code (..."));
        assert!(title.ends_with("deep/module/file.rs, Lines 1-2)"));
    }
}
