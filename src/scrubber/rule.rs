// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Rules and per-node rule evaluation

use tracing::trace;

use super::matcher::{FieldContext, FieldMatcher, Matcher};
use super::transform::{FieldTransform, Transform};
use super::value::Value;

/// Name of the built-in sensitive-key rule
pub const DEFAULT_RULE_NAME: &str = "default-sensitive";

/// A named matcher/transform pair.
///
/// A rule without a matcher never fires. A rule without a transform is
/// observe-only: matches are traced but the node is not marked as matched.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub matcher: Option<Matcher>,
    pub transform: Option<Transform>,
    /// Keep evaluating later rules on the transformed value
    pub chain: bool,
}

impl Rule {
    pub fn new(name: impl Into<String>, matcher: Matcher, transform: Transform) -> Self {
        Self {
            name: name.into(),
            matcher: Some(matcher),
            transform: Some(transform),
            chain: false,
        }
    }

    /// Rule that only traces its matches
    pub fn observe(name: impl Into<String>, matcher: Matcher) -> Self {
        Self {
            name: name.into(),
            matcher: Some(matcher),
            transform: None,
            chain: false,
        }
    }

    pub fn chained(mut self) -> Self {
        self.chain = true;
        self
    }

    pub fn matches(&self, ctx: &FieldContext<'_>) -> bool {
        self.matcher.as_ref().is_some_and(|m| m.matches(ctx))
    }

    pub(crate) fn default_sensitive(replacement: &str) -> Self {
        Self::new(
            DEFAULT_RULE_NAME,
            Matcher::default_sensitive(),
            Transform::replace_with(replacement),
        )
    }
}

/// Run `rules` in order against one node.
///
/// Returns the final working value if at least one transforming rule fired.
/// Each rule sees the output of the previous chained rule.
pub(crate) fn apply_rules(rules: &[Rule], ctx: &FieldContext<'_>) -> Option<Value> {
    let mut current: Option<Value> = None;

    for rule in rules {
        let node = ctx.with_value(current.as_ref().unwrap_or(ctx.value));
        if !rule.matches(&node) {
            continue;
        }
        let Some(transform) = &rule.transform else {
            trace!(rule = %rule.name, path = %node.dotted_path(), "observe-only rule matched");
            continue;
        };

        let replaced = transform.apply(&node);
        trace!(rule = %rule.name, path = %node.dotted_path(), "rule applied");
        current = Some(replaced);

        if !rule.chain {
            break;
        }
    }

    current
}
