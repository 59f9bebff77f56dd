//! `gatewarden-core` — domain foundation building blocks.
//!
//! This crate contains **pure identity primitives** shared by configuration
//! and claims handling (no infrastructure concerns).

pub mod identity;

pub use identity::{Realm, Resolver};
