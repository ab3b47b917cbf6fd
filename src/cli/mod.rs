//! CLI helpers for the installer binary.
//!
//! Output formatting utilities are in [`output`].

pub mod output;
