//! Core use-case services.
//!
//! Services orchestrate sessions and repositories; binaries stay free of SQL.

pub mod enrollment_service;
