//! Workflow file loading, parsing, and validation.
//!
//! A workflow file is YAML describing engine settings and an ordered list
//! of shell-command steps:
//!
//! ```
//! use std::path::Path;
//! use stepflow::config::{build_engine, parse_config};
//!
//! let config = parse_config(
//!     r#"
//! name: nightly
//! steps:
//!   - id: fetch
//!     command: echo fetching
//!   - id: parse
//!     command: echo parsing
//!     depends_on: [fetch]
//! "#,
//!     Path::new("nightly.yml"),
//! )
//! .unwrap();
//!
//! let engine = build_engine(&config).unwrap();
//! assert_eq!(engine.step_ids(), vec!["fetch", "parse"]);
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{build_engine, load_config_file, load_config_str, parse_config};
pub use schema::{SettingsConfig, StepConfig, WorkflowConfig};
pub use validator::{validate, Severity, ValidationIssue};
