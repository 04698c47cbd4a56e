//! Regular expression support for filter expressions
//!
//! Patterns reaching the engine through the `match()` and `search()` filter functions are
//! interpreted as [I-Regexp][rfc9485] and translated to the `regex` crate's dialect before
//! compilation. Compiled patterns are held in a bounded, thread-safe LRU cache; invalid
//! patterns are cached as invalid so they fail fast on reuse.
//!
//! [rfc9485]: https://www.rfc-editor.org/rfc/rfc9485.html

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::QueryError;

/// Default capacity of the compiled pattern cache
pub(crate) const DEFAULT_CACHE_CAPACITY: usize = 300;

/// A regular expression literal appearing directly in a filter expression, e.g.
/// `[?@.name =~ /no[a-z]*/i]`
#[derive(Debug, Clone)]
pub struct FilterRegex {
    pub(crate) pattern: String,
    pub(crate) flags: String,
    regex: Regex,
}

impl FilterRegex {
    /// Whether `haystack` is matched, in full, by this pattern
    pub(crate) fn is_full_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

// The compiled regex is derived from the pattern and flags, so they are all that equality
// needs to consider.
impl PartialEq for FilterRegex {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.flags == other.flags
    }
}

impl Eq for FilterRegex {}

impl std::fmt::Display for FilterRegex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/{}", self.pattern, self.flags)
    }
}

/// Compile a regex literal, anchoring it for full matches
pub(crate) fn compile_literal(pattern: &str, flags: &str) -> Result<FilterRegex, regex::Error> {
    let regex = Regex::new(&with_flags(&format!("^(?:{})$", map_iregexp(pattern)), flags))?;
    Ok(FilterRegex {
        pattern: pattern.to_owned(),
        flags: flags.to_owned(),
        regex,
    })
}

/// Prefix a pattern with the `regex`-crate rendition of the literal's flags
///
/// `i`, `m`, `s` and `x` translate directly; `a` is accepted for compatibility and ignored.
fn with_flags(pattern: &str, flags: &str) -> String {
    let kept: String = flags.chars().filter(|c| "imsx".contains(*c)).collect();
    if kept.is_empty() {
        pattern.to_owned()
    } else {
        format!("(?{kept}){pattern}")
    }
}

/// Convert an I-Regexp pattern into the `regex` crate's dialect
///
/// The only rewrite needed is `.`, which in I-Regexp matches any character other than
/// `\n`/`\r` (surrogates cannot occur in Rust strings, so the lone-surrogate exclusion is
/// already guaranteed). Dots inside character classes are left alone.
pub(crate) fn map_iregexp(pattern: &str) -> String {
    let mut escaped = false;
    let mut char_class = false;
    let mut out = String::with_capacity(pattern.len());
    for ch in pattern.chars() {
        if escaped {
            out.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '.' if !char_class => out.push_str("[^\\n\\r]"),
            '\\' => {
                escaped = true;
                out.push(ch);
            }
            '[' => {
                char_class = true;
                out.push(ch);
            }
            ']' => {
                char_class = false;
                out.push(ch);
            }
            ch => out.push(ch),
        }
    }
    out
}

/// Check whether a pattern stays within the I-Regexp subset
///
/// This is a structural approximation: it rejects the feature classes that I-Regexp
/// excludes (lookaround, backreferences, lazy quantifiers, anchors, and the Perl-style
/// character class escapes), not a full grammar validation.
pub(crate) fn check_iregexp(pattern: &str) -> bool {
    let mut chars = pattern.chars().peekable();
    let mut escaped = false;
    let mut char_class = false;
    while let Some(ch) = chars.next() {
        if escaped {
            escaped = false;
            match ch {
                'n' | 'r' | 't' | 'p' | 'P' | '.' | '\\' | '*' | '+' | '?' | '(' | ')' | '['
                | ']' | '{' | '}' | '|' | '-' | '^' | '$' => {}
                _ => return false,
            }
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '[' => char_class = true,
            ']' => char_class = false,
            '^' | '$' if !char_class => return false,
            '(' if chars.peek() == Some(&'?') => return false,
            '*' | '+' | '}' if chars.peek() == Some(&'?') => return false,
            _ => {}
        }
    }
    !escaped
}

/// How a cached pattern will be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PatternKind {
    /// The pattern must match the entire string, as in `match()`
    FullMatch,
    /// The pattern may match any substring, as in `search()`
    Search,
}

/// A bounded LRU cache from pattern strings to compiled patterns
///
/// Invalid patterns are cached as `None`.
struct PatternCache {
    map: HashMap<String, Option<Regex>>,
    order: VecDeque<String>,
    capacity: usize,
}

impl PatternCache {
    fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn get(&mut self, key: &str) -> Option<Option<Regex>> {
        if let Some(entry) = self.map.get(key) {
            let entry = entry.clone();
            self.touch(key);
            Some(entry)
        } else {
            None
        }
    }

    fn insert(&mut self, key: String, value: Option<Regex>) {
        if self.map.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.map.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.map.insert(key, value);
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            let k = self.order.remove(pos).expect("position is in bounds");
            self.order.push_back(k);
        }
    }
}

static PATTERN_CACHE: Lazy<Mutex<PatternCache>> =
    Lazy::new(|| Mutex::new(PatternCache::new(DEFAULT_CACHE_CAPACITY)));

/// Look up or compile the pattern used by the `match()` and `search()` filter functions
///
/// Returns `Ok(None)` for an invalid pattern unless `debug` is set, in which case an
/// invalid pattern propagates as a [`QueryError`].
pub(crate) fn lookup_pattern(
    pattern: &str,
    kind: PatternKind,
    iregexp_check: bool,
    debug: bool,
) -> Result<Option<Regex>, QueryError> {
    let key = match kind {
        PatternKind::FullMatch => format!("m:{pattern}"),
        PatternKind::Search => format!("s:{pattern}"),
    };
    let mut cache = PATTERN_CACHE.lock().expect("pattern cache lock");
    if let Some(cached) = cache.get(&key) {
        return match cached {
            Some(regex) => Ok(Some(regex)),
            None if debug => Err(QueryError::Regex {
                pattern: pattern.to_owned(),
            }),
            None => Ok(None),
        };
    }
    let compiled = if iregexp_check && !check_iregexp(pattern) {
        None
    } else {
        let mapped = match kind {
            PatternKind::FullMatch => format!("^(?:{})$", map_iregexp(pattern)),
            PatternKind::Search => map_iregexp(pattern),
        };
        Regex::new(&mapped).ok()
    };
    cache.insert(key, compiled.clone());
    match compiled {
        Some(regex) => Ok(Some(regex)),
        None if debug => Err(QueryError::Regex {
            pattern: pattern.to_owned(),
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::{check_iregexp, lookup_pattern, map_iregexp, PatternCache, PatternKind};

    #[test]
    fn dot_is_mapped_outside_char_classes() {
        assert_eq!(map_iregexp("a.c"), "a[^\\n\\r]c");
        assert_eq!(map_iregexp("a[.]c"), "a[.]c");
        assert_eq!(map_iregexp(r"a\.c"), r"a\.c");
    }

    #[test]
    fn iregexp_rejects_lookaround_and_backrefs() {
        assert!(check_iregexp("ab*c"));
        assert!(check_iregexp(r"\p{L}+"));
        assert!(!check_iregexp("(?=a)b"));
        assert!(!check_iregexp(r"(a)\1"));
        assert!(!check_iregexp("a*?"));
        assert!(!check_iregexp("^a$"));
    }

    #[test]
    fn invalid_patterns_are_cached_as_invalid() {
        assert!(lookup_pattern("a(", PatternKind::Search, false, false)
            .expect("not debug")
            .is_none());
        assert!(lookup_pattern("a(", PatternKind::Search, false, true).is_err());
    }

    #[test]
    fn cache_evicts_least_recently_used() {
        let mut cache = PatternCache::new(2);
        cache.insert("a".into(), None);
        cache.insert("b".into(), None);
        assert!(cache.get("a").is_some());
        cache.insert("c".into(), None);
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }
}
