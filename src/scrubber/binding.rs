// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Payload and tag hooks for persistence layers

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::warn;

use super::engine::{MaybeScrubber, Scrubber};
use super::error::Result;
use super::value::StringMap;

/// How a binding reacts to scrub failures and which inputs it touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingOptions {
    /// Surface JSON errors instead of passing the payload through
    pub fail_on_error: bool,
    /// Scrub tag maps as well as payloads
    pub scrub_tags: bool,
}

impl Default for BindingOptions {
    fn default() -> Self {
        Self {
            fail_on_error: false,
            scrub_tags: true,
        }
    }
}

/// Binds a shared scrubber to the payload and tag boundaries of a recorder.
///
/// Without a scrubber both hooks pass their input through.
#[derive(Debug, Clone, Default)]
pub struct ScrubberBinding {
    scrubber: Option<Arc<Scrubber>>,
    options: BindingOptions,
}

impl ScrubberBinding {
    pub fn new(scrubber: Option<Arc<Scrubber>>, options: BindingOptions) -> Self {
        Self { scrubber, options }
    }

    pub fn fail_on_error(mut self) -> Self {
        self.options.fail_on_error = true;
        self
    }

    pub fn skip_tags(mut self) -> Self {
        self.options.scrub_tags = false;
        self
    }

    pub fn options(&self) -> BindingOptions {
        self.options
    }

    /// Scrub a JSON payload before it is persisted
    pub fn scrub_payload<'a>(&self, payload: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        if payload.is_empty() {
            return Ok(Cow::Borrowed(payload));
        }

        match self.scrubber.as_deref().scrub_json(payload) {
            Ok(sanitized) => Ok(Cow::Owned(sanitized)),
            Err(err) if self.options.fail_on_error => Err(err),
            Err(err) => {
                warn!(error = %err, "payload scrub failed, keeping original payload");
                Ok(Cow::Borrowed(payload))
            }
        }
    }

    /// Scrub record tags; always returns a fresh map
    pub fn scrub_tags(&self, tags: &StringMap) -> StringMap {
        if !self.options.scrub_tags {
            return tags.clone();
        }
        self.scrubber.as_deref().scrub_string_map(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrubber::error::ScrubError;

    fn binding() -> ScrubberBinding {
        ScrubberBinding::new(Some(Arc::new(Scrubber::new())), BindingOptions::default())
    }

    fn tags() -> StringMap {
        let mut tags = StringMap::new();
        tags.insert("token".to_string(), "t".to_string());
        tags.insert("env".to_string(), "prod".to_string());
        tags
    }

    #[test]
    fn test_default_options() {
        let options = BindingOptions::default();
        assert!(!options.fail_on_error);
        assert!(options.scrub_tags);
    }

    #[test]
    fn test_payload_scrubbed() {
        let out = binding().scrub_payload(br#"{"secret":"s"}"#).unwrap();
        assert_eq!(out.as_ref(), br#"{"secret":"[REDACTED]"}"#);
    }

    #[test]
    fn test_empty_payload_borrowed() {
        let out = binding().scrub_payload(b"").unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn test_invalid_payload_passes_through_by_default() {
        let out = binding().scrub_payload(b"not json").unwrap();
        assert_eq!(out.as_ref(), b"not json");
    }

    #[test]
    fn test_invalid_payload_fails_when_configured() {
        let err = binding().fail_on_error().scrub_payload(b"not json").unwrap_err();
        assert!(matches!(err, ScrubError::Decode(_)));
    }

    #[test]
    fn test_tags_scrubbed() {
        let out = binding().scrub_tags(&tags());
        assert_eq!(out["token"], "[REDACTED]");
        assert_eq!(out["env"], "prod");
    }

    #[test]
    fn test_skip_tags() {
        let b = binding().skip_tags();
        assert!(!b.options().scrub_tags);
        assert_eq!(b.scrub_tags(&tags()), tags());
    }

    #[test]
    fn test_without_scrubber_passes_through() {
        let b = ScrubberBinding::default();
        assert_eq!(b.scrub_tags(&tags()), tags());
        let out = b.scrub_payload(br#"{"secret":"s"}"#).unwrap();
        assert_eq!(out.as_ref(), br#"{"secret":"s"}"#);
    }
}
