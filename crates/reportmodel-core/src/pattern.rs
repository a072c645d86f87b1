//! Tag pattern matching.
//!
//! # Matching Rules
//!
//! | Rule | Behavior |
//! |------|----------|
//! | **Anchoring** | Pattern must match the full tag |
//! | **Normalization** | Case, spaces and underscores are ignored on both sides |
//! | **`*`** | Matches any sequence of characters, including none |
//! | **`?`** | Matches exactly one character |
//!
//! # Examples
//!
//! ```text
//! smoke       → matches: smoke, Smoke, SMO_KE
//! req-*       → matches: req-1, REQ-42, req-
//! ?2          → matches: t2, x2   (not: 2, t12)
//! ```

use regex::{Regex, RegexBuilder};

/// Lowercase and drop spaces and underscores, the way tags are compared.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compiled tag pattern.
///
/// Wildcards are translated to an anchored regex over the normalized text,
/// so matching stays linear in the tag length however many `*` it has.
#[derive(Debug, Clone)]
pub struct TagPattern {
    regex: Option<Regex>,
}

impl TagPattern {
    pub fn new(pattern: &str) -> Self {
        let source = wildcard_regex(&normalize(pattern), ".*", ".");
        let regex = match Regex::new(&source) {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::warn!(pattern, error = %e, "tag pattern never matches");
                None
            }
        };
        Self { regex }
    }

    pub fn matches(&self, tag: &str) -> bool {
        self.regex
            .as_ref()
            .is_some_and(|regex| regex.is_match(&normalize(tag)))
    }
}

/// `^...$` regex source with `*` and `?` replaced and everything else escaped.
fn wildcard_regex(pattern: &str, any_sequence: &str, any_char: &str) -> String {
    let mut source = String::from("(?s)^");
    for c in pattern.chars() {
        match c {
            '*' => source.push_str(any_sequence),
            '?' => source.push_str(any_char),
            _ => source.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    source.push('$');
    source
}

/// A set of patterns; matches when any member matches.
#[derive(Debug, Clone, Default)]
pub struct TagPatterns {
    patterns: Vec<TagPattern>,
}

impl TagPatterns {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        Self {
            patterns: patterns
                .iter()
                .map(|p| TagPattern::new(p.as_ref()))
                .collect(),
        }
    }

    pub fn matches(&self, tag: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(tag))
    }

    /// True when any of `tags` matches any pattern.
    pub fn matches_any<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().any(|tag| self.matches(tag.as_ref()))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Pattern whose wildcards are capture groups, for `%N` substitution.
///
/// Matching is case-insensitive against the tag as written.
#[derive(Debug, Clone)]
pub struct CapturePattern {
    regex: Option<Regex>,
}

impl CapturePattern {
    pub fn new(pattern: &str) -> Self {
        let source = wildcard_regex(pattern, "(.*)", "(.)");
        let regex = match RegexBuilder::new(&source).case_insensitive(true).build() {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::warn!(pattern, error = %e, "tag link pattern never matches");
                None
            }
        };
        Self { regex }
    }

    /// Capture groups for a matching tag; group 0 is the whole tag.
    pub fn captures(&self, tag: &str) -> Option<Vec<String>> {
        let caps = self.regex.as_ref()?.captures(tag)?;
        Some(
            caps.iter()
                .map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        )
    }
}

/// Replace `%1`, `%2`, ... in `template` with the corresponding groups.
///
/// Placeholders without a matching group are left as written.
pub fn substitute_groups(template: &str, groups: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let mut digits = String::new();
        while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
            digits.push(*d);
            chars.next();
        }
        match digits.parse::<usize>().ok().filter(|n| *n > 0).and_then(|n| groups.get(n)) {
            Some(group) => out.push_str(group),
            None => {
                out.push('%');
                out.push_str(&digits);
            }
        }
    }
    out
}
