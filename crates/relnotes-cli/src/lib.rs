//! Release notes CLI library.
//!
//! Argument definitions and command handlers for the `relnotes` binary.

pub mod cli;
pub mod commands;
