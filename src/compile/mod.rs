//! Agent document compilation: definitions, templating, and rendering.

pub mod agents;
pub mod compiler;
pub mod template;

pub use agents::{AgentDef, Partial, load_agents};
pub use compiler::{CompileOutcome, CompiledAgent, DocumentCompiler};
