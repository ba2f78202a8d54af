//! Core data types for dependencies, advisories, and scan results.
//!
//! This module contains the fundamental types used throughout depscout:
//!
//! - [`Dependency`] - A dependency declared by a manifest
//! - [`Ecosystem`] - The packaging ecosystem a manifest belongs to
//! - [`Advisory`] - A published vulnerability advisory
//! - [`Vulnerability`] - An advisory matched against a declared dependency
//! - [`ScanResult`] - Per-manifest scan outcome
//!
//! # Example
//!
//! ```
//! use depscout::{Dependency, Ecosystem, ScanResult};
//!
//! let dep = Dependency::new("lodash", "4.17.20", Ecosystem::Npm);
//! let result = ScanResult::new("web/package-lock.json", Ecosystem::Npm, vec![dep]);
//!
//! println!("Scanned {} dependencies", result.dependencies.len());
//! ```

mod advisory;
mod dependency;
mod result;

pub use advisory::*;
pub use dependency::*;
pub use result::*;
