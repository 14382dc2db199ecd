//! Closed-Loop Tests
//!
//! Drive the simulated multirotor with the controller and check that the
//! tracking errors actually converge.

use approx::assert_relative_eq;
use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use std::thread;

use asmc_core::clock::ManualClock;
use asmc_core::control::{rate_error, rotation_error, AdaptiveGains, AttitudeSlidingModeLaw};
use asmc_core::handoff;
use asmc_core::math::rotation_matrix_from_quaternion;
use asmc_core::simulation::{QuadrotorDynamics, QuadrotorInput, QuadrotorParams, QuadrotorState};
use asmc_core::{AsmcController, ControllerConfig, Setpoint, VehicleSnapshot};

const DT: f64 = 0.005;

fn snapshot(state: &QuadrotorState, setpoint: Setpoint, armed: bool) -> VehicleSnapshot {
    VehicleSnapshot {
        pose: state.pose(),
        velocity: state.twist(),
        setpoint,
        armed,
    }
}

#[test]
fn test_position_converges_with_ideal_attitude() {
    let config = ControllerConfig::default();
    let max_thrust = config.position.max_thrust;
    let clock = ManualClock::new(0.0);
    let mut controller = AsmcController::with_clock(config, clock.clone()).unwrap();
    let quad = QuadrotorDynamics::new(QuadrotorParams::default());

    let setpoint = Setpoint::hold(Vector3::new(0.0, 0.0, 1.0));
    let mut state = QuadrotorState {
        position: Vector3::new(-0.3, -0.2, 0.7),
        ..Default::default()
    };

    // 10 s
    for _ in 0..2_000 {
        clock.advance(DT);
        let out = controller.step(&snapshot(&state, setpoint, true));

        assert!(out.thrust_vector().norm() <= max_thrust + 1e-9);
        assert!(out.singular.is_none());

        state = quad.step_with_attitude(&state, out.thrust_command().thrust, out.orientation(), DT);
    }

    let error = state.position - setpoint.position;
    assert!(error.norm() < 0.01, "final position error {:?}", error);
    assert!(state.velocity.norm() < 0.05, "final velocity {:?}", state.velocity);
    // Settled at hover: level attitude
    assert_relative_eq!(state.orientation.angle(), 0.0, epsilon = 1e-2);
}

#[test]
fn test_velocity_setpoint_is_tracked() {
    let clock = ManualClock::new(0.0);
    let mut controller = AsmcController::with_clock(ControllerConfig::default(), clock.clone()).unwrap();
    let quad = QuadrotorDynamics::new(QuadrotorParams::default());

    let mut state = QuadrotorState {
        position: Vector3::new(0.0, 0.0, 1.0),
        ..Default::default()
    };

    // Ramp reference moving along +x at 0.2 m/s, starting at the vehicle
    let speed = 0.2;
    let mut t = 0.0;
    for _ in 0..1_600 {
        t += DT;
        clock.advance(DT);
        let setpoint = Setpoint::hold(Vector3::new(speed * t, 0.0, 1.0)).with_velocity(Vector3::new(speed, 0.0, 0.0));

        let out = controller.step(&snapshot(&state, setpoint, true));
        state = quad.step_with_attitude(&state, out.thrust_command().thrust, out.orientation(), DT);
    }

    assert_relative_eq!(state.velocity.x, speed, epsilon = 0.02);
    assert_relative_eq!(state.position.z, 1.0, epsilon = 0.02);
}

#[test]
fn test_attitude_law_levels_tilted_vehicle() {
    let config = ControllerConfig::default();
    let mut law = AttitudeSlidingModeLaw::new(
        &config.attitude,
        &config.attitude_gains,
        config.attitude_boundary_layer(),
    )
    .unwrap();
    let quad = QuadrotorDynamics::new(QuadrotorParams::default());

    let r_des = Matrix3::identity();
    let mut state = QuadrotorState {
        orientation: UnitQuaternion::from_euler_angles(0.2, -0.15, 0.1),
        ..Default::default()
    };

    // 4 s at 500 Hz; rotation is independent of the translational free fall
    for _ in 0..2_000 {
        let r_curr = rotation_matrix_from_quaternion(&state.orientation);
        let e_r = rotation_error(&r_des, &r_curr);
        let e_w = rate_error(&r_des, &r_curr, &state.angular_velocity, &Vector3::zeros());

        let out = law.compute(&e_r, &e_w, 0.002, true);
        state = quad.step(&state, &QuadrotorInput::new(0.0, out.moment), 0.002);
    }

    let r_curr = rotation_matrix_from_quaternion(&state.orientation);
    assert!(rotation_error(&r_des, &r_curr).norm() < 1e-3);
    assert!(state.angular_velocity.norm() < 1e-2);
}

#[test]
fn test_controller_reads_from_handoff() {
    let (writer, reader) = handoff::channel(VehicleSnapshot::default());
    let clock = ManualClock::new(0.0);
    let mut controller = AsmcController::with_clock(ControllerConfig::default(), clock.clone()).unwrap();

    let producer = thread::spawn(move || {
        writer.publish_setpoint(Setpoint::hold(Vector3::new(0.0, 0.0, 1.0)));
        writer.publish_armed(true)
    });
    let last_sequence = producer.join().unwrap();

    let latest = reader.latest();
    assert_eq!(latest.sequence, last_sequence);

    clock.advance(0.02);
    let out = controller.step_latest(&reader);

    // Vehicle on the ground, one meter below the setpoint: thrust pushes up
    assert!(out.thrust_vector().z > 0.98);
    assert!(out.thrust_command().thrust > 0.0);
    // Armed flag arrived through the handoff, so the gains adapted
    let initial = AdaptiveGains::new(&ControllerConfig::default().position_gains).unwrap();
    assert_ne!(*controller.position_gains(), initial);
}
