//! # CLI Argument Definitions
//!
//! This module defines the command-line interface (CLI) structure using the `clap` crate.
//! It specifies the available subcommands, arguments, and flags for the application.

use clap::{Parser, Subcommand};

/// The main CLI structure parsing command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "cargo xtask")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Developer toolkit for the VersionHub workspace")]
pub struct Cli {
    /// The main subcommand to execute.
    #[command(subcommand)]
    pub command: AppCommands,
}

/// Enumeration of available application subcommands.
#[derive(Debug, Subcommand)]
pub enum AppCommands {
    /// Generate code artifacts
    #[command(alias = "migrations")]
    Codegen {
        #[command(subcommand)]
        action: CodegenAction,
    },
    /// Run tests (workspace by default)
    Test {
        /// Run tests for a specific crate (auto-prefixes with 'vhub-' if missing)
        project: Option<String>,
    },
    /// Run doc tests (workspace by default)
    Doctest {
        /// Run doc tests for a specific crate (auto-prefixes with 'vhub-' if missing)
        project: Option<String>,
    },
    /// Run a project
    Run {
        /// Run a specific crate (auto-prefixes with 'vhub-' if missing)
        project: String,
    },
    /// Run benches for a project
    Bench {
        /// Run benches for a specific crate (auto-prefixes with 'vhub-' if missing)
        project: String,
    },
}

/// Enumeration of codegen commands.
#[derive(Debug, Subcommand)]
pub enum CodegenAction {
    /// Generate a hardcoded migration manifest
    Migrations {},
}
