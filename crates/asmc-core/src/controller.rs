//! Per-vehicle ASMC controller
//!
//! Runs the whole control chain once per tick:
//!
//! position law -> thrust vector -> desired attitude -> SO(3) errors
//! against the current attitude -> attitude law -> desired moment
//!
//! A snapshot with a non-finite field never reaches the laws: the tick
//! re-issues the previous output and flags it in [`ControlOutput::rejected`].
//!
//! Consumers that only need an orientation command and consumers that also
//! need the collective throttle and attitude errors read different views of
//! the same [`ControlOutput`].

use nalgebra::Vector3;

use crate::clock::{MonotonicClock, SystemClock, TickTimer};
use crate::config::ControllerConfig;
use crate::control::{
    geometric_attitude_command, level_attitude, AdaptiveGains, AttitudeCommand,
    AttitudeErrorEstimate, AttitudeReferenceError, AttitudeSlidingModeLaw,
    FeedbackAttitudeErrorEstimator, MomentLawOutput, PositionLawOutput, PositionSlidingModeLaw,
};
use crate::error::ControlError;
use crate::handoff::SnapshotReader;
use crate::math::quaternion_to_xyzw;
use crate::state::{SnapshotError, VehicleSnapshot};
use crate::{Quat, Vec3};

/// Collective throttle plus attitude errors, the thrust-aware consumer view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrustCommand {
    /// Normalized collective throttle in `[0, max_throttle]`
    pub thrust: f64,
    /// Rotation error e_R
    pub rotation_error: Vec3,
    /// Angular rate error e_ω
    pub rate_error: Vec3,
}

/// Everything computed during one tick
#[derive(Debug, Clone)]
pub struct ControlOutput {
    /// Clamped tick interval used for adaptation [s]
    pub dt: f64,
    /// Commanded attitude
    pub attitude: AttitudeCommand,
    /// Throttle and attitude errors against the current attitude
    pub errors: AttitudeErrorEstimate,
    /// Position law result (thrust vector and diagnostics)
    pub position: PositionLawOutput,
    /// Attitude law result (desired moment and diagnostics)
    pub moment: MomentLawOutput,
    /// Set when the thrust vector gave no usable attitude this tick and the
    /// previous command was held
    pub singular: Option<AttitudeReferenceError>,
    /// Set when the snapshot was rejected and the previous output re-issued
    pub rejected: Option<SnapshotError>,
}

impl ControlOutput {
    /// Orientation command
    pub fn orientation(&self) -> Quat {
        self.attitude.orientation
    }

    /// Orientation command in scalar-last `[x, y, z, w]` wire order
    pub fn orientation_xyzw(&self) -> [f64; 4] {
        quaternion_to_xyzw(&self.attitude.orientation)
    }

    /// Throttle and attitude errors
    pub fn thrust_command(&self) -> ThrustCommand {
        ThrustCommand {
            thrust: self.errors.thrust,
            rotation_error: self.errors.rotation_error,
            rate_error: self.errors.rate_error,
        }
    }

    /// Desired body moment
    pub fn desired_moment(&self) -> Vec3 {
        self.moment.moment
    }

    /// Desired thrust vector (world frame) [N]
    pub fn thrust_vector(&self) -> Vec3 {
        self.position.thrust
    }
}

/// Adaptive sliding-mode controller for one vehicle
#[derive(Debug)]
pub struct AsmcController<C = SystemClock> {
    config: ControllerConfig,
    position_law: PositionSlidingModeLaw,
    attitude_law: AttitudeSlidingModeLaw,
    estimator: FeedbackAttitudeErrorEstimator,
    timer: TickTimer<C>,
    last_output: Option<ControlOutput>,
    ticks: u64,
}

impl AsmcController<SystemClock> {
    /// Controller timed by the system monotonic clock
    pub fn new(config: ControllerConfig) -> Result<Self, ControlError> {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: MonotonicClock> AsmcController<C> {
    /// Controller timed by `clock`
    ///
    /// # Errors
    /// [`ControlError::Config`] if any constant or initial gain is invalid.
    pub fn with_clock(config: ControllerConfig, clock: C) -> Result<Self, ControlError> {
        config.validate()?;

        let position_law = PositionSlidingModeLaw::new(config.position.clone(), &config.position_gains)?;
        let attitude_law = AttitudeSlidingModeLaw::new(
            &config.attitude,
            &config.attitude_gains,
            config.attitude_boundary_layer(),
        )?;
        let estimator = FeedbackAttitudeErrorEstimator::from_constants(&config.position)?;

        log::debug!(
            "ASMC controller ready: mass {} kg, max thrust {} N, boundary layer {}",
            config.position.mass,
            config.position.max_thrust,
            config.position.boundary_layer,
        );

        Ok(Self {
            config,
            position_law,
            attitude_law,
            estimator,
            timer: TickTimer::new(clock),
            last_output: None,
            ticks: 0,
        })
    }

    /// Run one control tick
    ///
    /// Reads the clock once; the clamped interval drives both adaptive laws.
    pub fn step(&mut self, snapshot: &VehicleSnapshot) -> ControlOutput {
        let dt = self.timer.tick();
        self.ticks += 1;

        if let Err(err) = snapshot.check_finite() {
            log::warn!("{}; re-issuing previous command", err);
            return self.hold(dt, snapshot, err);
        }

        let armed = snapshot.armed;
        let setpoint = &snapshot.setpoint;

        let position = self.position_law.compute(
            &snapshot.pose.position,
            &snapshot.velocity.linear,
            &setpoint.position,
            &setpoint.velocity,
            dt,
            armed,
        );

        let (attitude, singular) = match geometric_attitude_command(&position.thrust, setpoint.yaw) {
            Ok(command) => (command, None),
            Err(err) => {
                log::warn!("{}; holding previous attitude command", err);
                let held = match &self.last_output {
                    Some(last) => last.attitude,
                    None => AttitudeCommand::from_rotation(level_attitude(setpoint.yaw)),
                };
                (held, Some(err))
            }
        };

        let errors = self.estimator.estimate(
            &snapshot.pose.orientation,
            &snapshot.velocity.angular,
            &position.thrust,
            &attitude.rotation,
            &setpoint.angular_velocity,
        );

        let moment = self.attitude_law.compute(&errors.rotation_error, &errors.rate_error, dt, armed);

        log::trace!(
            "tick {}: dt {:.4} thrust {:.3} e_R {:?} armed {}",
            self.ticks,
            dt,
            errors.thrust,
            errors.rotation_error.as_slice(),
            armed,
        );

        let output = ControlOutput {
            dt,
            attitude,
            errors,
            position,
            moment,
            singular,
            rejected: None,
        };
        self.last_output = Some(output.clone());
        output
    }

    /// Re-issue the previous output for a rejected snapshot
    fn hold(&mut self, dt: f64, snapshot: &VehicleSnapshot, err: SnapshotError) -> ControlOutput {
        let mut output = match self.last_output.clone() {
            Some(last) => last,
            None => self.neutral_output(snapshot.setpoint.yaw),
        };
        output.dt = dt;
        output.singular = None;
        output.rejected = Some(err);
        output
    }

    /// Output with nothing to hold yet: level attitude, zero throttle and
    /// moment. Neither law adapts.
    fn neutral_output(&mut self, yaw: f64) -> ControlOutput {
        let yaw = if yaw.is_finite() { yaw } else { 0.0 };
        let zero = Vector3::zeros();

        let position = self.position_law.compute(&zero, &zero, &zero, &zero, 0.0, false);
        let moment = self.attitude_law.compute(&zero, &zero, 0.0, false);

        ControlOutput {
            dt: 0.0,
            attitude: AttitudeCommand::from_rotation(level_attitude(yaw)),
            errors: AttitudeErrorEstimate {
                thrust: 0.0,
                rotation_error: zero,
                rate_error: zero,
            },
            position,
            moment,
            singular: None,
            rejected: None,
        }
    }

    /// Run one tick on the latest snapshot from a handoff
    pub fn step_latest(&mut self, reader: &SnapshotReader) -> ControlOutput {
        self.step(&reader.latest().snapshot)
    }

    /// Run one tick, returning only the orientation command
    pub fn orientation_command(&mut self, snapshot: &VehicleSnapshot) -> Quat {
        self.step(snapshot).orientation()
    }

    /// Run one tick, returning the throttle and attitude errors
    pub fn thrust_command(&mut self, snapshot: &VehicleSnapshot) -> ThrustCommand {
        self.step(snapshot).thrust_command()
    }

    /// `Kp0`, `Kp1`
    pub fn position_gains(&self) -> &AdaptiveGains {
        self.position_law.gains()
    }

    /// `Kp0_q`, `Kp1_q`
    pub fn attitude_gains(&self) -> &AdaptiveGains {
        self.attitude_law.gains()
    }

    /// Current mass estimate [kg]
    pub fn mass(&self) -> f64 {
        self.position_law.mass()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Number of ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
