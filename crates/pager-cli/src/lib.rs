//! CLI library components for the `pager` binary.

#![allow(missing_docs)]

pub mod logging;
pub mod render;
pub mod session;
pub mod settings;
pub mod source;
