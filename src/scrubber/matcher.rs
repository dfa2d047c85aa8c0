// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Field matchers: predicates deciding whether a rule fires at a node

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

use super::error::{Result, ScrubError};
use super::value::Value;

/// Key names treated as sensitive by the built-in rule
pub const DEFAULT_SENSITIVE_KEYS: &[&str] = &[
    "password",
    "pass",
    "passwd",
    "secret",
    "token",
    "auth",
    "authorization",
    "api_key",
    "apikey",
    "access_token",
    "refresh_token",
    "session",
    "cookie",
    "set-cookie",
];

static DEFAULT_SENSITIVE_MATCHER: Lazy<Matcher> =
    Lazy::new(|| Matcher::key_insensitive(DEFAULT_SENSITIVE_KEYS.iter().copied()));

/// Read-only view of one visited node.
///
/// `value` may already be the output of an earlier chained rule at the same
/// node. Array elements carry a bracketed index segment such as `[2]`.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    pub path: &'a [String],
    pub key: &'a str,
    pub value: &'a Value,
}

impl<'a> FieldContext<'a> {
    pub fn new(path: &'a [String], key: &'a str, value: &'a Value) -> Self {
        Self { path, key, value }
    }

    /// Same node, different working value
    pub fn with_value<'b>(&self, value: &'b Value) -> FieldContext<'b>
    where
        'a: 'b,
    {
        FieldContext {
            path: self.path,
            key: self.key,
            value,
        }
    }

    /// Path joined with dots, for logging
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
}

/// Decides whether a rule applies to a node
pub trait FieldMatcher: Send + Sync {
    fn matches(&self, ctx: &FieldContext<'_>) -> bool;
}

impl<F> FieldMatcher for F
where
    F: Fn(&FieldContext<'_>) -> bool + Send + Sync,
{
    fn matches(&self, ctx: &FieldContext<'_>) -> bool {
        self(ctx)
    }
}

/// Built-in matchers plus user closures.
///
/// Candidate keys and path segments are normalized (trimmed, lower-cased,
/// blanks dropped) at construction; use the constructors rather than the
/// variants directly when the input is not already normalized.
#[derive(Clone)]
pub enum Matcher {
    /// Lower-cased key equals one of the candidates
    Key(Vec<String>),
    /// Lower-cased key starts with one of the candidates
    KeyPrefix(Vec<String>),
    /// Lower-cased key contains one of the candidates
    KeyContains(Vec<String>),
    /// Dot-separated patterns, `*` matches any single segment
    Path(Vec<Vec<String>>),
    /// `None` never matches
    KeyRegex(Option<Regex>),
    /// Matches the value's textual rendering; `None` never matches
    ValueRegex(Option<Regex>),
    Any(Vec<Matcher>),
    All(Vec<Matcher>),
    /// `Not(None)` is false
    Not(Option<Box<Matcher>>),
    Custom(Arc<dyn FieldMatcher>),
}

fn normalize<I, S>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let trimmed = candidate.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
        })
        .collect()
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| ScrubError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

impl Matcher {
    pub fn key_insensitive<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Matcher::Key(normalize(keys))
    }

    pub fn key_prefix_insensitive<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Matcher::KeyPrefix(normalize(prefixes))
    }

    pub fn key_contains_insensitive<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Matcher::KeyContains(normalize(parts))
    }

    /// Match full paths such as `user.*.email`
    pub fn path_insensitive<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<Vec<String>> = normalize(paths)
            .into_iter()
            .map(|path| {
                path.split('.')
                    .map(|seg| seg.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .collect();
        Matcher::Path(patterns)
    }

    pub fn key_regex(pattern: &str) -> Result<Self> {
        Ok(Matcher::KeyRegex(Some(compile(pattern)?)))
    }

    pub fn value_regex(pattern: &str) -> Result<Self> {
        Ok(Matcher::ValueRegex(Some(compile(pattern)?)))
    }

    pub fn any(matchers: impl IntoIterator<Item = Matcher>) -> Self {
        Matcher::Any(matchers.into_iter().collect())
    }

    pub fn all(matchers: impl IntoIterator<Item = Matcher>) -> Self {
        Matcher::All(matchers.into_iter().collect())
    }

    pub fn not(matcher: Matcher) -> Self {
        Matcher::Not(Some(Box::new(matcher)))
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&FieldContext<'_>) -> bool + Send + Sync + 'static,
    {
        Matcher::Custom(Arc::new(f))
    }

    /// Case-insensitive match on the built-in sensitive vocabulary
    pub fn default_sensitive() -> Self {
        DEFAULT_SENSITIVE_MATCHER.clone()
    }
}

fn path_matches(path: &[String], pattern: &[String]) -> bool {
    if path.len() != pattern.len() {
        return false;
    }
    path.iter()
        .zip(pattern)
        .all(|(segment, want)| want == "*" || segment.to_lowercase() == *want)
}

impl FieldMatcher for Matcher {
    fn matches(&self, ctx: &FieldContext<'_>) -> bool {
        match self {
            Matcher::Key(keys) => {
                let key = ctx.key.to_lowercase();
                keys.iter().any(|candidate| *candidate == key)
            }
            Matcher::KeyPrefix(prefixes) => {
                let key = ctx.key.to_lowercase();
                prefixes.iter().any(|prefix| key.starts_with(prefix.as_str()))
            }
            Matcher::KeyContains(parts) => {
                let key = ctx.key.to_lowercase();
                parts.iter().any(|part| key.contains(part.as_str()))
            }
            Matcher::Path(patterns) => patterns
                .iter()
                .any(|pattern| path_matches(ctx.path, pattern)),
            Matcher::KeyRegex(re) => re.as_ref().is_some_and(|re| re.is_match(ctx.key)),
            Matcher::ValueRegex(re) => match re {
                Some(re) if !ctx.value.is_null() => re.is_match(&ctx.value.render()),
                _ => false,
            },
            Matcher::Any(matchers) => matchers.iter().any(|m| m.matches(ctx)),
            Matcher::All(matchers) => matchers.iter().all(|m| m.matches(ctx)),
            Matcher::Not(inner) => inner.as_ref().is_some_and(|m| !m.matches(ctx)),
            Matcher::Custom(f) => f.matches(ctx),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Key(keys) => f.debug_tuple("Key").field(keys).finish(),
            Matcher::KeyPrefix(prefixes) => f.debug_tuple("KeyPrefix").field(prefixes).finish(),
            Matcher::KeyContains(parts) => f.debug_tuple("KeyContains").field(parts).finish(),
            Matcher::Path(patterns) => f.debug_tuple("Path").field(patterns).finish(),
            Matcher::KeyRegex(re) => f
                .debug_tuple("KeyRegex")
                .field(&re.as_ref().map(Regex::as_str))
                .finish(),
            Matcher::ValueRegex(re) => f
                .debug_tuple("ValueRegex")
                .field(&re.as_ref().map(Regex::as_str))
                .finish(),
            Matcher::Any(matchers) => f.debug_tuple("Any").field(matchers).finish(),
            Matcher::All(matchers) => f.debug_tuple("All").field(matchers).finish(),
            Matcher::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            Matcher::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
