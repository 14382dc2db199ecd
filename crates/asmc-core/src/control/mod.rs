//! Control laws for ASMC
//!
//! - Boundary-layer saturation shared by both sliding-mode loops
//! - Adaptive robustness gains (leaky integrator with floor)
//! - Position sliding-mode law (desired thrust vector)
//! - Thrust vector to desired attitude
//! - Geometric attitude command and SO(3) attitude errors
//! - Attitude sliding-mode law (desired moment)

pub mod saturation;
pub mod adaptive;
pub mod position;
pub mod attitude;
pub mod geometric;
pub mod moment;

pub use saturation::*;
pub use adaptive::*;
pub use position::*;
pub use attitude::*;
pub use geometric::*;
pub use moment::*;
