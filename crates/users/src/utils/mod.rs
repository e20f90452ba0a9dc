//! Internal utilities for the profile store.

pub mod validation;

pub use validation::*;
