// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Scrubber - rule-driven redaction of structured values
//
// Shape-preserving traversal over:
// - JSON-like object/array trees
// - Flat string maps (tags) and string-list maps (headers)
// - Ordered lists, with index-aware paths for every element

pub mod binding;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
#[cfg(feature = "python")]
pub mod python;
pub mod rule;
pub mod transform;
pub mod value;

pub use binding::{BindingOptions, ScrubberBinding};
pub use config::{MatcherConfig, RuleConfig, ScrubberConfig, TransformConfig};
pub use engine::{MaybeScrubber, Scrubber, ScrubberOptions, DEFAULT_REPLACEMENT};
pub use error::{Result, ScrubError};
pub use matcher::{FieldContext, FieldMatcher, Matcher, DEFAULT_SENSITIVE_KEYS};
#[cfg(feature = "python")]
pub use python::ScrubberRust;
pub use rule::{Rule, DEFAULT_RULE_NAME};
pub use transform::{FieldTransform, Transform};
pub use value::{ObjectMap, StringListMap, StringMap, Value};
