//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod compile;
pub mod copy;
pub mod init;
pub mod list;
pub mod show;
pub mod status;
pub mod update;
pub mod validate;

use crate::app::AppContext;
use crate::error::Result;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a .sw project directory
    Init(init::InitArgs),

    /// List skills in the merged matrix
    List(list::ListArgs),

    /// Show one skill's metadata and document
    Show(show::ShowArgs),

    /// Validate the project's skill selection
    Validate(validate::ValidateArgs),

    /// Compile agent documents from the current selection
    Compile(compile::CompileArgs),

    /// Copy shared skills into the project with fork records
    Copy(copy::CopyArgs),

    /// Classify local skills against their upstream source
    Status(status::StatusArgs),

    /// Refresh local skill copies from upstream
    Update(update::UpdateArgs),
}

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Init(args) => init::run(ctx, args),
        Commands::List(args) => list::run(ctx, args),
        Commands::Show(args) => show::run(ctx, args),
        Commands::Validate(args) => validate::run(ctx, args),
        Commands::Compile(args) => compile::run(ctx, args),
        Commands::Copy(args) => copy::run(ctx, args),
        Commands::Status(args) => status::run(ctx, args),
        Commands::Update(args) => update::run(ctx, args),
    }
}
