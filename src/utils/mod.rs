//! Process-level helpers for binaries built on the engine.

pub mod bootstrap;
