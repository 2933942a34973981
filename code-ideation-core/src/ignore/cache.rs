// pattern cache module - memoises compiled matchers for one session

use std::collections::HashMap;
use tracing::debug;

use super::glob::{compile_pattern, Matcher};

/// compiled matchers keyed by the raw pattern text the caller passed in
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: HashMap<String, Matcher>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// compile a pattern, reusing an earlier translation of the same text
    pub fn compile(&mut self, pattern: &str) -> Matcher {
        if let Some(matcher) = self.compiled.get(pattern) {
            debug!("pattern cache hit for {pattern:?}");
            return matcher.clone();
        }

        let matcher = compile_pattern(pattern);
        self.compiled.insert(pattern.to_string(), matcher.clone());
        matcher
    }

    /// compile one pattern per line, skipping lines that are blank after trimming
    pub fn compile_patterns<I, S>(&mut self, lines: I) -> Vec<Matcher>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .filter_map(|line| {
                let trimmed = line.as_ref().trim();
                (!trimmed.is_empty()).then(|| self.compile(trimmed))
            })
            .collect()
    }

    /// compile newline-separated pattern text as typed by the user
    pub fn compile_pattern_text(&mut self, text: &str) -> Vec<Matcher> {
        self.compile_patterns(text.split('\n'))
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// forget every compiled matcher (session reset)
    pub fn clear(&mut self) {
        self.compiled.clear();
    }
}
