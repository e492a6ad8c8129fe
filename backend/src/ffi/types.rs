//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types/errors and PyO3-compatible types.

use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::models::ModelError;
use crate::objective::{ManagerConfig, ManagerError};

// ========================================================================
// PyDict Extraction Helpers
// ========================================================================

/// Extract a field from a Python dict, falling back to a default when missing.
///
/// # Errors
/// Returns error only if type conversion fails
fn extract_with_default<'py, T>(dict: &Bound<'py, PyDict>, key: &str, default: T) -> PyResult<T>
where
    T: FromPyObject<'py>,
{
    match dict.get_item(key)? {
        Some(value) if !value.is_none() => value.extract(),
        _ => Ok(default),
    }
}

/// Parse the optional manager configuration dict
///
/// Recognized keys: `current_rule`.
pub fn parse_manager_config(py_config: Option<&Bound<'_, PyDict>>) -> PyResult<ManagerConfig> {
    let defaults = ManagerConfig::default();
    let Some(dict) = py_config else {
        return Ok(defaults);
    };
    Ok(ManagerConfig {
        current_rule: extract_with_default(dict, "current_rule", defaults.current_rule)?,
    })
}

// ========================================================================
// Error Conversion
// ========================================================================

pub fn manager_error_to_py(err: ManagerError) -> PyErr {
    match err {
        ManagerError::UnknownRule(_) => {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(err.to_string())
        }
        _ => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(err.to_string()),
    }
}

pub fn model_error_to_py(err: ModelError) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Invalid tree: {}", err))
}

pub fn json_error_to_py(err: serde_json::Error) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Invalid JSON: {}", err))
}
