//! Snapshot handoff between estimator/setpoint threads and the control loop
//!
//! One [`SnapshotWriter`] (not clonable) publishes pose, velocity, setpoint
//! and armed updates; one [`SnapshotReader`] hands the control loop a copy of
//! the whole [`VehicleSnapshot`]. Each publish replaces a complete field
//! under the lock and bumps a sequence number, so a tick can never observe
//! half of an update.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::state::{Pose, Setpoint, VehicleSnapshot, Velocity};

#[derive(Debug, Default)]
struct Shared {
    sequence: u64,
    snapshot: VehicleSnapshot,
}

/// A snapshot together with the sequence number of the last update in it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sequenced {
    pub sequence: u64,
    pub snapshot: VehicleSnapshot,
}

/// Create a connected writer/reader pair starting from `initial`
pub fn channel(initial: VehicleSnapshot) -> (SnapshotWriter, SnapshotReader) {
    let shared = Arc::new(Mutex::new(Shared {
        sequence: 0,
        snapshot: initial,
    }));
    (
        SnapshotWriter { shared: shared.clone() },
        SnapshotReader { shared },
    )
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    // Writes replace whole fields, a poisoned lock still holds a complete snapshot
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Publishing side of the handoff
#[derive(Debug)]
pub struct SnapshotWriter {
    shared: Arc<Mutex<Shared>>,
}

impl SnapshotWriter {
    fn publish(&self, update: impl FnOnce(&mut VehicleSnapshot)) -> u64 {
        let mut guard = lock(&self.shared);
        update(&mut guard.snapshot);
        guard.sequence += 1;
        guard.sequence
    }

    pub fn publish_pose(&self, pose: Pose) -> u64 {
        self.publish(|s| s.pose = pose)
    }

    pub fn publish_velocity(&self, velocity: Velocity) -> u64 {
        self.publish(|s| s.velocity = velocity)
    }

    /// Pose and velocity from the same odometry message
    pub fn publish_odometry(&self, pose: Pose, velocity: Velocity) -> u64 {
        self.publish(|s| {
            s.pose = pose;
            s.velocity = velocity;
        })
    }

    pub fn publish_setpoint(&self, setpoint: Setpoint) -> u64 {
        self.publish(|s| s.setpoint = setpoint)
    }

    pub fn publish_armed(&self, armed: bool) -> u64 {
        self.publish(|s| s.armed = armed)
    }
}

/// Control-loop side of the handoff
#[derive(Debug)]
pub struct SnapshotReader {
    shared: Arc<Mutex<Shared>>,
}

impl SnapshotReader {
    /// Copy of the latest consistent snapshot
    pub fn latest(&self) -> Sequenced {
        let guard = lock(&self.shared);
        Sequenced {
            sequence: guard.sequence,
            snapshot: guard.snapshot,
        }
    }
}
