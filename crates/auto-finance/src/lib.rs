//! Vehicle financing advisor.
//!
//! Turns a short applicant profile into a cash / finance / lease comparison and
//! walks the applicant through it with a small wizard state machine. Remote
//! text generation is optional everywhere: every remote call has a local
//! heuristic with the same output shape.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
