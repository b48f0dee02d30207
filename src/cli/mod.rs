//! CLI commands for Rote.
//!
//! This module provides CLI commands for Rote, organized into:
//! - **Drill command**: run (interactive sessions)
//! - **Set commands**: sets, show, build, edit, drop (managing stored sets)
//! - **Utility commands**: results, init

// Drill command
pub mod run;

// Set commands
pub mod build;
pub mod drop;
pub mod edit;
pub mod sets;
pub mod show;

// Utility commands
pub mod init;
pub mod results;

pub use build::BuildCommand;
pub use drop::DropCommand;
pub use edit::EditCommand;
pub use init::InitCommand;
pub use results::ResultsCommand;
pub use run::RunCommand;
pub use sets::SetsCommand;
pub use show::ShowCommand;
