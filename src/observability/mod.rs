//! Observability for the relay itself.
//!
//! The relay reports *other* code's events; this module covers the
//! relay's own counters. Structured logging goes straight through
//! `tracing` at the call sites.

pub mod metrics;
