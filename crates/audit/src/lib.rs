//! # Chessmind Audit
//!
//! Diagnostic logging for failures the game recovers from: strategist
//! errors, illegal or unparseable agent output, memory store trouble and
//! cancelled sessions.

mod diagnostic_log;

pub use diagnostic_log::{DiagnosticEntry, DiagnosticEventType, DiagnosticLog, DiagnosticStats};
