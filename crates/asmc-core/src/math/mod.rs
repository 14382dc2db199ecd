//! Mathematical utilities for ASMC
//!
//! Implements SO(3) helpers (hat/vee maps, rotation matrix <-> quaternion)
//! and quaternion kinematics used by the simulation plant.

pub mod quaternion;
pub mod rotation;

pub use quaternion::*;
pub use rotation::*;
