// glob translation module - turns one ignore pattern into a path matcher

use regex::Regex;
use tracing::warn;

/// how a compiled matcher tests a path
#[derive(Debug, Clone)]
pub enum MatcherKind {
    /// matches no path at all (empty or separator-only patterns)
    Never,
    /// expression over the normalised path
    Regex(Regex),
}

/// a compiled, immutable ignore pattern
#[derive(Debug, Clone)]
pub struct Matcher {
    source: String,
    anchored: bool,
    kind: MatcherKind,
}

impl Matcher {
    fn never(source: &str) -> Self {
        Self {
            source: source.to_string(),
            anchored: false,
            kind: MatcherKind::Never,
        }
    }

    /// the pattern text this matcher was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// true when the matcher only tests the root-anchored (`/`-prefixed) path form
    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub fn kind(&self) -> &MatcherKind {
        &self.kind
    }

    /// the compiled expression, if any
    pub fn expression(&self) -> Option<&str> {
        match &self.kind {
            MatcherKind::Never => None,
            MatcherKind::Regex(re) => Some(re.as_str()),
        }
    }

    /// test a single raw path against this matcher
    pub fn is_match(&self, path: &str) -> bool {
        let relative = relative_form(path);
        let absolute = format!("/{relative}");
        self.matches_forms(&relative, &absolute)
    }

    pub(crate) fn matches_forms(&self, relative: &str, absolute: &str) -> bool {
        match &self.kind {
            MatcherKind::Never => false,
            MatcherKind::Regex(re) if self.anchored => re.is_match(absolute),
            MatcherKind::Regex(re) => re.is_match(relative),
        }
    }
}

/// normalise separators and drop a single leading slash
pub(crate) fn relative_form(path: &str) -> String {
    let normalised = path.replace('\\', "/");
    match normalised.strip_prefix('/') {
        Some(rest) => rest.to_string(),
        None => normalised,
    }
}

/// compile one ignore pattern without caching
///
/// never fails: patterns whose translation is rejected by the regex engine fall
/// back to an exact literal match of the trimmed pattern.
pub fn compile_pattern(pattern: &str) -> Matcher {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return Matcher::never(pattern);
    }

    // decide intent before normalisation strips the slashes
    let directory_intent = trimmed.ends_with('/');
    let root_anchored = trimmed.starts_with('/');

    let normalised = trimmed.replace('\\', "/");
    let normalised = normalised.trim_matches('/');

    if normalised.is_empty() {
        if root_anchored && directory_intent {
            return match Regex::new("^/.*$") {
                Ok(re) => Matcher {
                    source: pattern.to_string(),
                    anchored: true,
                    kind: MatcherKind::Regex(re),
                },
                Err(_) => Matcher::never(pattern),
            };
        }
        return Matcher::never(pattern);
    }

    let body = translate_wildcards(normalised);
    let body = if directory_intent {
        format!("{body}/.*")
    } else {
        format!("{body}$")
    };
    let expression = if root_anchored {
        format!("^/{body}")
    } else {
        format!("(?:^|/){body}")
    };

    match Regex::new(&expression) {
        Ok(re) => Matcher {
            source: pattern.to_string(),
            anchored: root_anchored,
            kind: MatcherKind::Regex(re),
        },
        Err(e) => {
            warn!("invalid glob pattern {trimmed:?}, using literal match: {e}");
            literal_fallback(pattern, trimmed)
        }
    }
}

/// exact match of the trimmed pattern text, special characters escaped
fn literal_fallback(pattern: &str, trimmed: &str) -> Matcher {
    let expression = format!("^{}$", regex::escape(trimmed));
    match Regex::new(&expression) {
        Ok(re) => Matcher {
            source: pattern.to_string(),
            anchored: trimmed.starts_with('/'),
            kind: MatcherKind::Regex(re),
        },
        Err(e) => {
            warn!("literal fallback for {trimmed:?} failed to compile: {e}");
            Matcher::never(pattern)
        }
    }
}

/// escape literal dots, `**` crosses separators, `*` stays within a segment
fn translate_wildcards(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2);
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '.' => out.push_str("\\."),
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str(".*");
            }
            '*' => out.push_str("[^/]*"),
            other => out.push(other),
        }
    }
    out
}
