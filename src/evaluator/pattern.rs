//! Compiled pattern cache for `like` and the regex functions
//!
//! Simple `like` patterns are matched with plain string operations:
//!
//! - `abc`   exact
//! - `abc%`  prefix
//! - `%abc`  suffix
//! - `%abc%` contains
//! - `%`     anything
//!
//! Neither wildcard matches a newline, so the shortcuts check that the
//! text the wildcards cover has none. Everything else compiles to a regex.
//! Compiled patterns (and compile failures) are cached per evaluator, so a
//! bad pattern is reported once while it stays cached.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use regex::{Regex, RegexBuilder};

/// Maximum number of cached patterns; half are evicted when exceeded
const MAX_CACHED_PATTERNS: usize = 1024;

#[derive(Debug, Clone)]
pub enum CompiledPattern {
    Exact(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
    MatchAll,
    Regex(Regex),
}

impl CompiledPattern {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            CompiledPattern::Exact(s) => text == s,
            CompiledPattern::Prefix(p) => text
                .strip_prefix(p.as_str())
                .is_some_and(|rest| !rest.contains('\n')),
            CompiledPattern::Suffix(s) => text
                .strip_suffix(s.as_str())
                .is_some_and(|head| !head.contains('\n')),
            CompiledPattern::Contains(c) => contains_spanning_newlines(text, c),
            CompiledPattern::MatchAll => !text.contains('\n'),
            CompiledPattern::Regex(re) => re.is_match(text),
        }
    }
}

/// How a pattern string is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// `like`: `%` any run, `_` one character, full match
    Like,
    /// `regex_contains`: match anywhere
    Search,
    /// `regex_match`: the whole string must match
    FullMatch,
}

type CacheEntry = Result<Rc<CompiledPattern>, String>;

#[derive(Debug)]
pub struct PatternCache {
    size_limit: usize,
    entries: RefCell<HashMap<(PatternKind, String), CacheEntry>>,
}

impl PatternCache {
    pub fn new(size_limit: usize) -> Self {
        Self {
            size_limit,
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Compiles or fetches a pattern.
    ///
    /// The `bool` is true when this call compiled the pattern for the first
    /// time, so callers can report a failure exactly once.
    pub fn get(&self, kind: PatternKind, pattern: &str) -> (CacheEntry, bool) {
        let key = (kind, pattern.to_string());
        if let Some(entry) = self.entries.borrow().get(&key) {
            return (entry.clone(), false);
        }

        let entry = self.compile(kind, pattern).map(Rc::new);
        let mut entries = self.entries.borrow_mut();
        if entries.len() >= MAX_CACHED_PATTERNS {
            let evicted: Vec<_> = entries.keys().take(MAX_CACHED_PATTERNS / 2).cloned().collect();
            for key in evicted {
                entries.remove(&key);
            }
        }
        entries.insert(key, entry.clone());
        (entry, true)
    }

    fn compile(&self, kind: PatternKind, pattern: &str) -> Result<CompiledPattern, String> {
        match kind {
            PatternKind::Like => match classify_like(pattern) {
                Some(simple) => Ok(simple),
                None => self.build(&format!("^(?:{})$", like_to_regex(pattern))),
            },
            PatternKind::Search => self.build(pattern),
            PatternKind::FullMatch => self.build(&format!("^(?:{})$", pattern)),
        }
    }

    fn build(&self, source: &str) -> Result<CompiledPattern, String> {
        RegexBuilder::new(source)
            .size_limit(self.size_limit)
            .build()
            .map(CompiledPattern::Regex)
            .map_err(|e| e.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

fn classify_like(pattern: &str) -> Option<CompiledPattern> {
    if pattern.contains('_') {
        return None;
    }

    let starts = pattern.starts_with('%');
    let ends = pattern.ends_with('%');
    let inner = pattern.trim_start_matches('%').trim_end_matches('%');

    if inner.contains('%') {
        return None;
    }

    Some(match (starts, ends) {
        _ if inner.is_empty() && (starts || ends) => CompiledPattern::MatchAll,
        (false, false) => CompiledPattern::Exact(inner.to_string()),
        (false, true) => CompiledPattern::Prefix(inner.to_string()),
        (true, false) => CompiledPattern::Suffix(inner.to_string()),
        (true, true) => CompiledPattern::Contains(inner.to_string()),
    })
}

/// `%c%` where neither `%` may cover a newline: some occurrence of `c` must
/// start at or before the first newline and end after the last one.
fn contains_spanning_newlines(text: &str, c: &str) -> bool {
    let (Some(first), Some(last)) = (text.find('\n'), text.rfind('\n')) else {
        return text.contains(c);
    };
    text.char_indices()
        .take_while(|(i, _)| *i <= first)
        .any(|(i, _)| text[i..].starts_with(c) && i + c.len() > last)
}

fn like_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut literal = [0u8; 4];
    for c in pattern.chars() {
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            c => out.push_str(&regex::escape(c.encode_utf8(&mut literal))),
        }
    }
    out
}
