//! Terrafix library crate
//!
//! Exposes the extraction-locate-patch pipeline and its collaborators so
//! external tooling can drive remediation without going through the CLI.

pub mod block;
pub mod config;
pub mod llm;
pub mod locate;
pub mod patch;
pub mod prompt;
pub mod publish;
pub mod remediation;
pub mod report;
pub mod retrieval;
pub mod util;
