//! # Chessmind CLI
//!
//! Terminal front end: argument parsing, configuration overrides, the
//! terminal presenter and keyboard input for human players.

pub mod commands;
pub mod input;
pub mod presenter;
pub mod session;
