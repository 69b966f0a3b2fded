//! Crate-level tests for the recipe runtime.

mod fixtures;
