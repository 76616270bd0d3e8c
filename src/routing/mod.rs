//! Route table plumbing.
//!
//! Routing dispatch itself lives outside this core; the lifecycle only
//! compiles configured route specifications into an immutable table the
//! server module exposes, and swaps a fresh table in on reload.

pub mod table;

pub use table::{RouteEntry, RouteTable};
