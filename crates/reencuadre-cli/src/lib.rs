//! Command line front end for reframing sessions.
//!
//! - [`args`] - `clap` definitions of the `reencuadre` command
//! - [`cli`] - entry point and command routing
//! - [`commands`] - one handler per subcommand
//! - [`settings`] - optional TOML settings file
//! - [`output`] - render trees to terminal, HTML, text or JSON

pub mod args;
pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod settings;
