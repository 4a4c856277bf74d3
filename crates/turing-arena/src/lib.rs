//! Turing Arena binary support.
//!
//! Wires the orchestrator, HTTP API and history store into a CLI with
//! `serve`, `run` and `history` subcommands.

pub mod cli;
pub mod commands;
pub mod config;
