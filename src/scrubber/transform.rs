// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Field transforms: compute the replacement for a matched node

use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::matcher::FieldContext;
use super::value::Value;

/// Produces the replacement value for a matched node
pub trait FieldTransform: Send + Sync {
    fn apply(&self, ctx: &FieldContext<'_>) -> Value;
}

impl<F> FieldTransform for F
where
    F: Fn(&FieldContext<'_>) -> Value + Send + Sync,
{
    fn apply(&self, ctx: &FieldContext<'_>) -> Value {
        self(ctx)
    }
}

/// Built-in transforms plus user closures
#[derive(Clone)]
pub enum Transform {
    /// Constant replacement, input ignored
    Replace(Value),
    /// Explicit absence; surfaces as `Null`
    Remove,
    /// Keep `keep_start` leading and `keep_end` trailing characters
    Mask {
        mask: char,
        keep_start: usize,
        keep_end: usize,
    },
    /// Same character count, every character replaced by the first char of `mask_source`
    PreserveLength { mask_source: String },
    /// `[HASH:xxxxxxxx]` from SHA256 of the rendered value
    Hash,
    /// `[TOKEN:xxxxxxxx]` from a random UUID
    Tokenize,
    Custom(Arc<dyn FieldTransform>),
}

impl Transform {
    pub fn replace_with(replacement: impl Into<Value>) -> Self {
        Transform::Replace(replacement.into())
    }

    pub fn remove_value() -> Self {
        Transform::Remove
    }

    /// Negative keep counts clamp to zero; a NUL mask falls back to `*`
    pub fn mask_string(mask: char, keep_start: i64, keep_end: i64) -> Self {
        Transform::Mask {
            mask: if mask == '\0' { '*' } else { mask },
            keep_start: usize::try_from(keep_start).unwrap_or(0),
            keep_end: usize::try_from(keep_end).unwrap_or(0),
        }
    }

    pub fn preserve_length(replacement: &str) -> Self {
        let mask_source = if replacement.is_empty() {
            "*".to_string()
        } else {
            replacement.to_string()
        };
        Transform::PreserveLength { mask_source }
    }

    pub fn hash() -> Self {
        Transform::Hash
    }

    pub fn tokenize() -> Self {
        Transform::Tokenize
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&FieldContext<'_>) -> Value + Send + Sync + 'static,
    {
        Transform::Custom(Arc::new(f))
    }
}

impl FieldTransform for Transform {
    fn apply(&self, ctx: &FieldContext<'_>) -> Value {
        match self {
            Transform::Replace(replacement) => replacement.clone(),
            Transform::Remove => Value::Null,
            Transform::Mask {
                mask,
                keep_start,
                keep_end,
            } => {
                if ctx.value.is_null() {
                    return Value::Null;
                }
                Value::String(mask_string(
                    &ctx.value.render(),
                    *mask,
                    *keep_start,
                    *keep_end,
                ))
            }
            Transform::PreserveLength { mask_source } => {
                let text = ctx.value.render();
                if text.is_empty() {
                    return Value::String(mask_source.clone());
                }
                let mask = mask_source.chars().next().unwrap_or('*');
                Value::String(std::iter::repeat(mask).take(text.chars().count()).collect())
            }
            Transform::Hash => {
                if ctx.value.is_null() {
                    return Value::Null;
                }
                Value::String(hash_mask(&ctx.value.render()))
            }
            Transform::Tokenize => {
                if ctx.value.is_null() {
                    return Value::Null;
                }
                Value::String(tokenize_mask())
            }
            Transform::Custom(f) => f.apply(ctx),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Transform::Remove => f.write_str("Remove"),
            Transform::Mask {
                mask,
                keep_start,
                keep_end,
            } => f
                .debug_struct("Mask")
                .field("mask", mask)
                .field("keep_start", keep_start)
                .field("keep_end", keep_end)
                .finish(),
            Transform::PreserveLength { mask_source } => f
                .debug_struct("PreserveLength")
                .field("mask_source", mask_source)
                .finish(),
            Transform::Hash => f.write_str("Hash"),
            Transform::Tokenize => f.write_str("Tokenize"),
            Transform::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Mask the interior of `value`, counting by character rather than byte
fn mask_string(value: &str, mask: char, keep_start: usize, keep_end: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    let length = chars.len();
    if keep_start.saturating_add(keep_end) >= length {
        return std::iter::repeat(mask).take(length).collect();
    }

    let mut masked = String::with_capacity(value.len());
    masked.extend(&chars[..keep_start]);
    masked.extend(std::iter::repeat(mask).take(length - keep_start - keep_end));
    masked.extend(&chars[length - keep_end..]);
    masked
}

/// Hash masking using SHA256
fn hash_mask(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    format!("[HASH:{}]", &format!("{:x}", result)[..8])
}

/// Tokenize using UUID v4
fn tokenize_mask() -> String {
    let token = Uuid::new_v4();
    format!("[TOKEN:{}]", &token.simple().to_string()[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(transform: &Transform, value: Value) -> Value {
        let path = vec!["field".to_string()];
        transform.apply(&FieldContext::new(&path, "field", &value))
    }

    #[test]
    fn test_replace_ignores_input() {
        let transform = Transform::replace_with("[X]");
        assert_eq!(apply(&transform, Value::from(12_i64)), Value::from("[X]"));
        assert_eq!(apply(&transform, Value::Null), Value::from("[X]"));
    }

    #[test]
    fn test_remove_is_null() {
        assert!(apply(&Transform::remove_value(), Value::from("x")).is_null());
    }

    #[test]
    fn test_mask_keeps_tail() {
        let transform = Transform::mask_string('*', 0, 4);
        assert_eq!(
            apply(&transform, Value::from("1234567890")),
            Value::from("******7890")
        );
    }

    #[test]
    fn test_mask_keeps_head_and_tail() {
        let transform = Transform::mask_string('#', 2, 2);
        assert_eq!(apply(&transform, Value::from("abcdefg")), Value::from("ab###fg"));
    }

    #[test]
    fn test_mask_counts_code_points() {
        let transform = Transform::mask_string('*', 1, 1);
        assert_eq!(apply(&transform, Value::from("héllo")), Value::from("h***o"));
        assert_eq!(apply(&transform, Value::from("日本語です")), Value::from("日***す"));
    }

    #[test]
    fn test_mask_fully_when_keep_covers_length() {
        let transform = Transform::mask_string('*', 3, 3);
        assert_eq!(apply(&transform, Value::from("abcdef")), Value::from("******"));
        assert_eq!(apply(&transform, Value::from("ab")), Value::from("**"));
    }

    #[test]
    fn test_mask_clamps_negative_counts() {
        let transform = Transform::mask_string('x', -3, -1);
        assert_eq!(apply(&transform, Value::from("abc")), Value::from("xxx"));
    }

    #[test]
    fn test_mask_renders_numbers_and_skips_null() {
        let transform = Transform::mask_string('*', 0, 2);
        assert_eq!(apply(&transform, Value::from(123456_i64)), Value::from("****56"));
        assert!(apply(&transform, Value::Null).is_null());
        assert_eq!(apply(&transform, Value::from("")), Value::from(""));
    }

    #[test]
    fn test_preserve_length() {
        let transform = Transform::preserve_length("#?");
        assert_eq!(apply(&transform, Value::from("héllo")), Value::from("#####"));
    }

    #[test]
    fn test_preserve_length_defaults_and_degenerate_input() {
        let transform = Transform::preserve_length("");
        assert_eq!(apply(&transform, Value::from("abc")), Value::from("***"));
        assert_eq!(apply(&transform, Value::from("")), Value::from("*"));

        let transform = Transform::preserve_length("--");
        assert_eq!(apply(&transform, Value::Null), Value::from("--"));
    }

    #[test]
    fn test_hash_mask() {
        let result = apply(&Transform::hash(), Value::from("sensitive"));
        let text = result.as_str().unwrap();
        assert!(text.starts_with("[HASH:"));
        assert!(text.ends_with(']'));
        assert_eq!(text.len(), 15); // [HASH:xxxxxxxx]
        assert_eq!(apply(&Transform::hash(), Value::from("sensitive")), result);
        assert!(apply(&Transform::hash(), Value::Null).is_null());
    }

    #[test]
    fn test_tokenize_mask() {
        let result = apply(&Transform::tokenize(), Value::from("sensitive"));
        let text = result.as_str().unwrap();
        assert!(text.starts_with("[TOKEN:"));
        assert!(text.ends_with(']'));
        assert!(apply(&Transform::tokenize(), Value::Null).is_null());
    }

    #[test]
    fn test_custom_closure() {
        let transform = Transform::custom(|ctx| Value::from(ctx.key.to_uppercase()));
        assert_eq!(apply(&transform, Value::from("x")), Value::from("FIELD"));
    }
}
