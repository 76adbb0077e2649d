//! Aesthetic fatigue CLI library.
//!
//! This crate provides the command-line interface for the fatigue engine.

mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Commands};
