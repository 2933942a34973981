// ignore module - glob-style ignore patterns for excluding files from analysis

pub mod cache;
pub mod glob;

pub use cache::PatternCache;
pub use glob::{compile_pattern, Matcher, MatcherKind};

use glob::relative_form;

/// patterns applied when the user has not configured any
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "node_modules/",
    "dist/",
    "build/",
    ".git/",
    "*.log",
    "*.tmp",
    "*.test.js",
    "*.spec.js",
];

/// compile a list of pattern lines with a throwaway cache
pub fn compile_patterns<I, S>(lines: I) -> Vec<Matcher>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    PatternCache::new().compile_patterns(lines)
}

/// check whether a path is excluded by any of the matchers
pub fn is_ignored(path: &str, matchers: &[Matcher]) -> bool {
    if matchers.is_empty() {
        return false;
    }

    let relative = relative_form(path);
    let absolute = format!("/{relative}");
    matchers
        .iter()
        .any(|matcher| matcher.matches_forms(&relative, &absolute))
}
