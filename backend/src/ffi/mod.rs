//! Python bindings (feature `pyo3`)

pub mod tree;
pub mod types;
