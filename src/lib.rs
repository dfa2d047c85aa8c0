// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Rule-driven redaction of structured payloads and tags
// Optional PyO3 bindings for Python callers

// PyO3 macro expansions define impls outside the annotated item
#![cfg_attr(feature = "python", allow(non_local_definitions))]

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod scrubber;

/// Python module: scrubber_rust
///
/// Exposes the Rust scrubber to Python callers that sanitize payloads and
/// tags before persisting or logging them.
///
/// # Examples
///
/// ```python
/// from scrubber_rust import ScrubberRust
///
/// scrubber = ScrubberRust({"default_replacement": "***"})
///
/// scrubber.scrub({"password": "hunter2", "profile": {"token": "abc", "name": "john"}})
/// # {"password": "***", "profile": {"token": "***", "name": "john"}}
///
/// scrubber.scrub_string_map({"session": "s1", "route": "/login"})
/// # {"session": "***", "route": "/login"}
/// ```
#[cfg(feature = "python")]
#[pymodule]
fn scrubber_rust(m: &Bound<'_, pyo3::types::PyModule>) -> PyResult<()> {
    m.add_class::<scrubber::ScrubberRust>()?;

    // Module metadata
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add(
        "__doc__",
        "Rule-driven redaction of structured payloads and tags",
    )?;

    Ok(())
}
