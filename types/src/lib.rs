//! Fundamental types for the specter client.
//!
//! This crate defines the leaf types shared across every other crate in the
//! workspace: verification outcomes, motion timing parameters, and the
//! records cached in local storage.

pub mod motion;
pub mod outcome;
pub mod query;

pub use motion::MotionParams;
pub use outcome::Outcome;
pub use query::SavedSearch;
