//! Tunekeeper: library-export maintenance.
//!
//! Everything lives under [`core`]; the binary is a thin CLI on top.

pub mod core;
