pub mod advisory;
pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod export;
pub mod matcher;
pub mod model;
pub mod output;
pub mod parser;
pub mod version;

pub use config::Config;
pub use engine::Engine;
pub use error::{AdvisoryError, ExportError, ParseError, ScanError};
pub use model::{Advisory, Dependency, Ecosystem, ScanResult, Severity, Vulnerability};
