// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PyO3 bindings for the scrubber

use pyo3::exceptions::{PyOverflowError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyBytes, PyDict, PyFloat, PyInt, PyList, PyString, PyTuple};
use std::collections::HashMap;

use super::config::{compile_rules, RuleConfig, ScrubberConfig};
use super::engine::Scrubber;
use super::error::ScrubError;
use super::value::{ObjectMap, Value};

/// Scrubber exposed to Python
///
/// # Example (Python)
/// ```python
/// from scrubber_rust import ScrubberRust
///
/// scrubber = ScrubberRust({
///     "rules": [
///         {
///             "name": "card",
///             "matcher": {"type": "key_contains", "keys": ["card"]},
///             "transform": {"type": "mask", "keep_end": 4},
///         }
///     ]
/// })
///
/// scrubber.scrub({"password": "x", "card_number": "4111111111111111"})
/// # {"password": "[REDACTED]", "card_number": "************1111"}
///
/// scrubber.scrub_json(b'{"token": "abc"}')
/// # b'{"token":"[REDACTED]"}'
/// ```
#[pyclass]
pub struct ScrubberRust {
    scrubber: Scrubber,
}

#[pymethods]
impl ScrubberRust {
    /// Create a new scrubber
    ///
    /// # Configuration Keys
    /// * `include_defaults` (bool): Prepend the built-in sensitive-key rule
    /// * `default_replacement` (str): Text used by the built-in rule (default: "[REDACTED]")
    /// * `rules` (list[dict]): Rule definitions with `name`, `matcher`, `transform`, `chain`
    #[new]
    #[pyo3(signature = (config_dict=None))]
    pub fn new(config_dict: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let config = match config_dict {
            Some(dict) => ScrubberConfig::from_json_value(py_to_json(dict.as_any())?)?,
            None => ScrubberConfig::default(),
        };
        Ok(Self {
            scrubber: config.compile()?,
        })
    }

    /// Scrub a dict, list or scalar, returning a new object
    pub fn scrub(&self, py: Python<'_>, data: &Bound<'_, PyAny>) -> PyResult<Py<PyAny>> {
        let value = py_to_value(data)?;
        value_to_py(py, &self.scrubber.scrub(&value))
    }

    /// Scrub a JSON document given as `bytes` or `str`
    pub fn scrub_json(&self, py: Python<'_>, data: &Bound<'_, PyAny>) -> PyResult<Py<PyBytes>> {
        let scrubbed = if let Ok(bytes) = data.downcast::<PyBytes>() {
            self.scrubber.scrub_json(bytes.as_bytes())?
        } else {
            let text: String = data.extract()?;
            self.scrubber.scrub_json(text.as_bytes())?
        };
        Ok(PyBytes::new(py, &scrubbed).unbind())
    }

    /// Scrub flat string tags
    pub fn scrub_string_map(&self, tags: HashMap<String, String>) -> HashMap<String, String> {
        self.scrubber.scrub_string_map(&tags)
    }

    /// Append rule definitions after construction
    pub fn add_rules(&mut self, rules: &Bound<'_, PyList>) -> PyResult<()> {
        let defs: Vec<RuleConfig> =
            serde_json::from_value(py_to_json(rules.as_any())?).map_err(ScrubError::InvalidConfig)?;
        self.scrubber.add_rules(compile_rules(&defs)?);
        Ok(())
    }

    /// Names of the active rules, in evaluation order
    pub fn rule_names(&self) -> Vec<String> {
        self.scrubber
            .rules()
            .iter()
            .map(|rule| rule.name.clone())
            .collect()
    }
}

fn py_to_json(data: &Bound<'_, PyAny>) -> PyResult<serde_json::Value> {
    Ok(serde_json::Value::from(py_to_value(data)?))
}

/// Convert a Python object into a scrubber value.
///
/// Dicts become objects and lists/tuples generic lists. Objects of any other
/// type are rendered with `str()`. Numbers with no exact JSON form raise
/// rather than coming back altered.
fn py_to_value(data: &Bound<'_, PyAny>) -> PyResult<Value> {
    if data.is_none() {
        return Ok(Value::Null);
    }
    // bool is a subclass of int, check it first
    if let Ok(flag) = data.downcast::<PyBool>() {
        return Ok(Value::Bool(flag.is_true()));
    }
    if let Ok(int) = data.downcast::<PyInt>() {
        if let Ok(v) = int.extract::<i64>() {
            return Ok(Value::from(v));
        }
        if let Ok(v) = int.extract::<u64>() {
            return Ok(Value::from(v));
        }
        return Err(PyOverflowError::new_err(format!(
            "integer {} does not fit in 64 bits",
            int.str()?
        )));
    }
    if let Ok(float) = data.downcast::<PyFloat>() {
        let v = float.value();
        return serde_json::Number::from_f64(v)
            .map(Value::Number)
            .ok_or_else(|| PyValueError::new_err(format!("non-finite float {v} is not supported")));
    }
    if let Ok(text) = data.downcast::<PyString>() {
        return Ok(Value::String(text.to_str()?.to_owned()));
    }
    if let Ok(dict) = data.downcast::<PyDict>() {
        let mut map = ObjectMap::new();
        for (key, value) in dict.iter() {
            let key: String = key.extract()?;
            map.insert(key, py_to_value(&value)?);
        }
        return Ok(Value::Object(map));
    }
    if let Ok(list) = data.downcast::<PyList>() {
        let items = list
            .iter()
            .map(|item| py_to_value(&item))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok(Value::List(items));
    }
    if let Ok(tuple) = data.downcast::<PyTuple>() {
        let items = tuple
            .iter()
            .map(|item| py_to_value(&item))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok(Value::List(items));
    }

    Ok(Value::String(data.str()?.to_str()?.to_owned()))
}

fn value_to_py(py: Python<'_>, value: &Value) -> PyResult<Py<PyAny>> {
    Ok(match value {
        Value::Null => py.None(),
        Value::Bool(flag) => PyBool::new(py, *flag).to_owned().into_any().unbind(),
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                v.into_pyobject(py)?.into_any().unbind()
            } else if let Some(v) = n.as_u64() {
                v.into_pyobject(py)?.into_any().unbind()
            } else {
                PyFloat::new(py, n.as_f64().unwrap_or(f64::NAN))
                    .into_any()
                    .unbind()
            }
        }
        Value::String(s) => PyString::new(py, s).into_any().unbind(),
        Value::Object(map) => {
            let dict = PyDict::new(py);
            for (key, val) in map {
                dict.set_item(key, value_to_py(py, val)?)?;
            }
            dict.into_any().unbind()
        }
        Value::StringMap(map) => {
            let dict = PyDict::new(py);
            for (key, val) in map {
                dict.set_item(key, val)?;
            }
            dict.into_any().unbind()
        }
        Value::StringListMap(map) => {
            let dict = PyDict::new(py);
            for (key, vals) in map {
                dict.set_item(key, PyList::new(py, vals)?)?;
            }
            dict.into_any().unbind()
        }
        Value::StringList(items) => PyList::new(py, items)?.into_any().unbind(),
        Value::List(items) => {
            let list = PyList::empty(py);
            for item in items {
                list.append(value_to_py(py, item)?)?;
            }
            list.into_any().unbind()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyo3::ffi::c_str;
    use std::ffi::CStr;

    fn eval<'py>(py: Python<'py>, code: &CStr) -> Bound<'py, PyAny> {
        py.eval(code, None, None).unwrap()
    }

    fn card_scrubber(py: Python<'_>) -> ScrubberRust {
        let config = eval(
            py,
            c_str!(
                "{'default_replacement': '***', 'rules': [{'name': 'card', \
                 'matcher': {'type': 'key_contains', 'keys': ['card']}, \
                 'transform': {'type': 'mask', 'keep_end': 4}}]}"
            ),
        );
        ScrubberRust::new(Some(config.downcast::<PyDict>().unwrap())).unwrap()
    }

    fn scrub_err(scrubber: &ScrubberRust, py: Python<'_>, code: &CStr) -> PyErr {
        scrubber.scrub(py, &eval(py, code)).unwrap_err()
    }

    #[test]
    fn test_new_with_config_dict() {
        Python::initialize();
        Python::attach(|py| {
            let scrubber = card_scrubber(py);
            assert_eq!(scrubber.rule_names(), vec!["default-sensitive", "card"]);

            let default = ScrubberRust::new(None).unwrap();
            assert_eq!(default.rule_names(), vec!["default-sensitive"]);
        });
    }

    #[test]
    fn test_scrub_nested_dict_and_list() {
        Python::initialize();
        Python::attach(|py| {
            let scrubber = card_scrubber(py);
            let data = eval(
                py,
                c_str!(
                    "{'password': 'x', 'card_number': '4111111111111111', \
                     'items': [{'token': 't', 'n': 1}, 2.5, None, True, ('a', 'b')]}"
                ),
            );
            let out = scrubber.scrub(py, &data).unwrap();
            let out = out.bind(py);

            let expected = eval(
                py,
                c_str!(
                    "{'password': '***', 'card_number': '************1111', \
                     'items': [{'token': '***', 'n': 1}, 2.5, None, True, ['a', 'b']]}"
                ),
            );
            assert!(out.eq(&expected).unwrap());

            let flag = out.get_item("items").unwrap().get_item(3).unwrap();
            assert!(flag.is_instance_of::<PyBool>());
            // input is left untouched
            assert_eq!(
                data.get_item("password").unwrap().extract::<String>().unwrap(),
                "x"
            );
        });
    }

    #[test]
    fn test_scrub_keeps_wide_unsigned_int() {
        Python::initialize();
        Python::attach(|py| {
            let scrubber = ScrubberRust::new(None).unwrap();
            let data = eval(py, c_str!("{'n': [1, 2**64 - 1, -2**63]}"));
            let out = scrubber.scrub(py, &data).unwrap();
            assert!(out.bind(py).eq(&data).unwrap());
        });
    }

    #[test]
    fn test_scrub_rejects_int_beyond_64_bits() {
        Python::initialize();
        Python::attach(|py| {
            let scrubber = ScrubberRust::new(None).unwrap();
            let err = scrub_err(&scrubber, py, c_str!("{'n': [1, 2**70]}"));
            assert!(err.is_instance_of::<PyOverflowError>(py));
            let err = scrub_err(&scrubber, py, c_str!("-2**64"));
            assert!(err.is_instance_of::<PyOverflowError>(py));
        });
    }

    #[test]
    fn test_scrub_rejects_non_finite_float() {
        Python::initialize();
        Python::attach(|py| {
            let scrubber = ScrubberRust::new(None).unwrap();
            let err = scrub_err(&scrubber, py, c_str!("{'x': float('nan')}"));
            assert!(err.is_instance_of::<PyValueError>(py));
            let err = scrub_err(&scrubber, py, c_str!("[float('inf')]"));
            assert!(err.is_instance_of::<PyValueError>(py));
            let err = scrub_err(&scrubber, py, c_str!("float('-inf')"));
            assert!(err.is_instance_of::<PyValueError>(py));
        });
    }

    #[test]
    fn test_scrub_json_bytes_and_str() {
        Python::initialize();
        Python::attach(|py| {
            let scrubber = ScrubberRust::new(None).unwrap();

            let bytes = PyBytes::new(py, b"{\"token\":1}");
            let out = scrubber.scrub_json(py, bytes.as_any()).unwrap();
            assert_eq!(out.bind(py).as_bytes(), b"{\"token\":\"[REDACTED]\"}");

            let text = PyString::new(py, "{\"token\":1}");
            let out = scrubber.scrub_json(py, text.as_any()).unwrap();
            assert_eq!(out.bind(py).as_bytes(), b"{\"token\":\"[REDACTED]\"}");

            let err = scrubber
                .scrub_json(py, PyString::new(py, "{").as_any())
                .unwrap_err();
            assert!(err.is_instance_of::<PyValueError>(py));
        });
    }

    #[test]
    fn test_scrub_string_map() {
        Python::initialize();
        Python::attach(|py| {
            let scrubber = card_scrubber(py);
            let mut tags = HashMap::new();
            tags.insert("secret".to_string(), "s".to_string());
            tags.insert("card".to_string(), "12345".to_string());
            tags.insert("env".to_string(), "prod".to_string());

            let out = scrubber.scrub_string_map(tags);
            assert_eq!(out["secret"], "***");
            assert_eq!(out["card"], "*2345");
            assert_eq!(out["env"], "prod");
        });
    }

    #[test]
    fn test_add_rules_appends_in_order() {
        Python::initialize();
        Python::attach(|py| {
            let mut scrubber = ScrubberRust::new(None).unwrap();
            let rules = eval(
                py,
                c_str!(
                    "[{'name': 'x', 'matcher': {'type': 'key', 'keys': ['x']}, \
                     'transform': {'type': 'remove'}}]"
                ),
            );
            scrubber.add_rules(rules.downcast::<PyList>().unwrap()).unwrap();
            assert_eq!(scrubber.rule_names(), vec!["default-sensitive", "x"]);

            let out = scrubber.scrub(py, &eval(py, c_str!("{'x': 1, 'y': 2}"))).unwrap();
            assert!(out.bind(py).eq(eval(py, c_str!("{'x': None, 'y': 2}"))).unwrap());
        });
    }

    #[test]
    fn test_bad_config_raises_value_error() {
        Python::initialize();
        Python::attach(|py| {
            let unknown = eval(
                py,
                c_str!("{'rules': [{'name': 'r', 'matcher': {'type': 'nope'}}]}"),
            );
            let Err(err) = ScrubberRust::new(Some(unknown.downcast::<PyDict>().unwrap())) else {
                panic!("unknown matcher type accepted");
            };
            assert!(err.is_instance_of::<PyValueError>(py));

            let bad_pattern = eval(
                py,
                c_str!("{'rules': [{'name': 'r', 'matcher': {'type': 'key_regex', 'pattern': '('}}]}"),
            );
            let Err(err) = ScrubberRust::new(Some(bad_pattern.downcast::<PyDict>().unwrap())) else {
                panic!("invalid pattern accepted");
            };
            assert!(err.is_instance_of::<PyValueError>(py));

            let mut scrubber = ScrubberRust::new(None).unwrap();
            let rules = eval(py, c_str!("[{'matcher': {'type': 'key', 'keys': ['x']}}]"));
            let err = scrubber
                .add_rules(rules.downcast::<PyList>().unwrap())
                .unwrap_err();
            assert!(err.is_instance_of::<PyValueError>(py));
            assert_eq!(scrubber.rule_names(), vec!["default-sensitive"]);
        });
    }
}
