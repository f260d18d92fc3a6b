//! skillweaver - compose reusable skill documents into agent prompts.
//!
//! The crate is organized around one data flow: the matrix loader merges
//! skill/category/stack definitions from the shared source and the project's
//! local overrides, the validator checks the selection against relation
//! rules, the assignment resolver partitions skills per agent into preloaded
//! and dynamic, and the compiler renders one document per agent. Provenance
//! tracking runs orthogonally at copy time and at status-check time.

pub mod app;
pub mod cli;
pub mod compile;
pub mod config;
pub mod error;
pub mod matrix;
pub mod provenance;
pub mod resolve;
pub mod utils;
pub mod validate;

pub use error::{Result, SwError};
