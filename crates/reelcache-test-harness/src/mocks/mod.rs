//! Mock implementations for testing.

pub mod backend;
pub mod network;

pub use backend::*;
pub use network::*;
