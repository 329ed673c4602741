//! Core building blocks for rail-translate
//!
//! - **codebase**: Codebases, project spaces, writable copies and fingerprints
//! - **config**: Configuration (rail.toml) parsing and validation
//! - **context**: Run context shared by every translation (temp root, task reporter)
//! - **error**: Error types with contextual help messages and exit codes
//! - **process**: External rewriting tool invocation
//! - **temp**: Process-wide temp root and scoped allocations

pub mod codebase;
pub mod config;
pub mod context;
pub mod error;
pub mod process;
pub mod temp;
