// src/interfaces/mod.rs
//! Interfaces module
//!
//! Seams between the settlement core and its external collaborators: the
//! time source, the L1 anchor receiving proposals, and the wrapped token.

mod bridge_interface;
mod clock_interface;
mod rollup_interface;

pub use bridge_interface::*;
pub use clock_interface::*;
pub use rollup_interface::*;
