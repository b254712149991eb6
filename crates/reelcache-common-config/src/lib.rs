//! Configuration helpers for Reelcache.
//!
//! Every Reelcache setting is read from the process environment, optionally
//! seeded from `.env` files. The variable names used by the cache layer are
//! fixed for compatibility with existing deployments.

pub mod env;

pub use env::*;
