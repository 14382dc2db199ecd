//! Simulation plant for closed-loop testing
//!
//! A rigid-body multirotor (ENU, z-up) driven by the controller's
//! normalized throttle and desired moment.

pub mod quadrotor;

pub use quadrotor::*;
