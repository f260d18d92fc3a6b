//! The skill matrix: loading, merging, and lookup.
//!
//! A matrix is the merged, in-memory snapshot of every skill, category, and
//! stack visible to one resolution pass. It is built fresh for each pass and
//! never mutated afterwards.

pub mod loader;
pub mod merge;
pub mod parser;
pub mod types;

pub use loader::{LoadWarning, LoadedLayer, MatrixLayers, load_layer, load_layers, resolve_source_root};
pub use merge::merge_layers;
pub use types::{Category, Matrix, Skill, SkillRelations, Stack, StackAgentEntry};
