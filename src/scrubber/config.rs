// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Declarative scrubber policy, compiled into rules

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::binding::{BindingOptions, ScrubberBinding};
use super::engine::{Scrubber, DEFAULT_REPLACEMENT};
use super::error::{Result, ScrubError};
use super::matcher::Matcher;
use super::rule::Rule;
use super::transform::Transform;
use super::value::Value;

/// Matcher definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatcherConfig {
    Key { keys: Vec<String> },
    KeyPrefix { keys: Vec<String> },
    KeyContains { keys: Vec<String> },
    Path { paths: Vec<String> },
    KeyRegex { pattern: String },
    ValueRegex { pattern: String },
    Any { matchers: Vec<MatcherConfig> },
    All { matchers: Vec<MatcherConfig> },
    Not { matcher: Box<MatcherConfig> },
}

/// Transform definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformConfig {
    Replace {
        with: serde_json::Value,
    },
    Remove,
    Mask {
        #[serde(default = "default_mask_char")]
        mask_char: char,
        #[serde(default)]
        keep_start: i64,
        #[serde(default)]
        keep_end: i64,
    },
    PreserveLength {
        #[serde(default)]
        replacement: String,
    },
    Hash,
    Tokenize,
}

fn default_mask_char() -> char {
    '*'
}

/// Rule definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub name: String,
    #[serde(default)]
    pub matcher: Option<MatcherConfig>,
    #[serde(default)]
    pub transform: Option<TransformConfig>,
    #[serde(default)]
    pub chain: bool,
}

/// Configuration for a Scrubber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrubberConfig {
    pub include_defaults: bool,
    pub default_replacement: String,
    pub rules: Vec<RuleConfig>,
    /// Options for the payload and tag hooks built by [`ScrubberConfig::binding`]
    pub binding: BindingOptions,
}

impl Default for ScrubberConfig {
    fn default() -> Self {
        Self {
            include_defaults: true,
            default_replacement: DEFAULT_REPLACEMENT.to_string(),
            rules: Vec::new(),
            binding: BindingOptions::default(),
        }
    }
}

impl MatcherConfig {
    /// Build the matcher, compiling any expressions
    pub fn compile(&self) -> Result<Matcher> {
        Ok(match self {
            MatcherConfig::Key { keys } => Matcher::key_insensitive(keys),
            MatcherConfig::KeyPrefix { keys } => Matcher::key_prefix_insensitive(keys),
            MatcherConfig::KeyContains { keys } => Matcher::key_contains_insensitive(keys),
            MatcherConfig::Path { paths } => Matcher::path_insensitive(paths),
            MatcherConfig::KeyRegex { pattern } => Matcher::key_regex(pattern)?,
            MatcherConfig::ValueRegex { pattern } => Matcher::value_regex(pattern)?,
            MatcherConfig::Any { matchers } => Matcher::Any(compile_all(matchers)?),
            MatcherConfig::All { matchers } => Matcher::All(compile_all(matchers)?),
            MatcherConfig::Not { matcher } => Matcher::not(matcher.compile()?),
        })
    }
}

fn compile_all(matchers: &[MatcherConfig]) -> Result<Vec<Matcher>> {
    matchers.iter().map(MatcherConfig::compile).collect()
}

impl TransformConfig {
    pub fn compile(&self) -> Transform {
        match self {
            TransformConfig::Replace { with } => Transform::replace_with(Value::from(with.clone())),
            TransformConfig::Remove => Transform::remove_value(),
            TransformConfig::Mask {
                mask_char,
                keep_start,
                keep_end,
            } => Transform::mask_string(*mask_char, *keep_start, *keep_end),
            TransformConfig::PreserveLength { replacement } => {
                Transform::preserve_length(replacement)
            }
            TransformConfig::Hash => Transform::hash(),
            TransformConfig::Tokenize => Transform::tokenize(),
        }
    }
}

impl RuleConfig {
    pub fn compile(&self) -> Result<Rule> {
        Ok(Rule {
            name: self.name.clone(),
            matcher: self.matcher.as_ref().map(MatcherConfig::compile).transpose()?,
            transform: self.transform.as_ref().map(TransformConfig::compile),
            chain: self.chain,
        })
    }
}

impl ScrubberConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(ScrubError::InvalidConfig)
    }

    pub fn from_json_value(json: serde_json::Value) -> Result<Self> {
        serde_json::from_value(json).map_err(ScrubError::InvalidConfig)
    }

    /// Compile every rule and build the scrubber
    pub fn compile(&self) -> Result<Scrubber> {
        let rules = compile_rules(&self.rules)?;
        let mut options = Scrubber::builder()
            .with_default_replacement(self.default_replacement.clone())
            .with_rules(rules);
        if !self.include_defaults {
            options = options.without_default_rules();
        }
        Ok(options.build())
    }

    /// Compile the scrubber and bind it with the configured hook options
    pub fn binding(&self) -> Result<ScrubberBinding> {
        Ok(ScrubberBinding::new(
            Some(Arc::new(self.compile()?)),
            self.binding,
        ))
    }
}

/// Compile a batch of rule definitions, failing on the first bad pattern
pub fn compile_rules(rules: &[RuleConfig]) -> Result<Vec<Rule>> {
    rules.iter().map(RuleConfig::compile).collect()
}
