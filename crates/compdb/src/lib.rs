//! Compilation-database generation for ChromeOS C++ codebases.
//!
//! Each backend (Chromium, Platform2, EC) knows how to shell out to the
//! build system that produces `compile_commands.json` for its tree. The
//! shared [`CompdbGenerator`] wraps a backend with the generation state
//! machine: it decides when a run is warranted, prevents duplicate
//! concurrent runs, remembers permanent failure, and rolls back state on
//! cancellation. A [`CompdbRegistry`] composes the generators so a single
//! document-save event triggers at most one run.

pub mod backends;
pub mod error;
pub mod exec;
pub mod generator;
pub mod state;

pub use error::{CompdbError, CompdbErrorKind, Result};
pub use exec::{CommandOutput, CommandRequest, CommandRunner, LocalCommandRunner};
pub use generator::{
    CompdbBackend, CompdbGenerator, CompdbRegistry, Document, GenerateContext, UserPrompter,
    ACTION_ADD_FOLDER, ACTION_DONT_SHOW_AGAIN,
};
pub use state::{GenerationState, ShouldGenerate};
