//! examrunner-core: question banks, exam sessions, scoring, and persistence.
//!
//! This crate holds everything except the terminal front end: extracting
//! questions from heterogeneous JSON, the session state machine, reports,
//! configuration, and save/restore of sessions.

pub mod builtin;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod session;
pub mod store;
pub mod traits;
