//! ==============================================================================
//! source.rs - observation record sources
//! ==============================================================================
//!
//! purpose:
//!     supplies one ObservationRecord per reporting cycle.
//!     the reporter only depends on the RecordSource trait, so the simulated
//!     source here can be swapped for a live vehicle-tracking pipeline
//!     without touching the sender.
//!
//! relationships:
//!     - used by: runtime.rs (Reporter pulls one record per iteration)
//!     - produces: domain.rs (ObservationRecord)
//!
//! ==============================================================================

use crate::domain::ObservationRecord;
use chrono::Local;
use std::collections::BTreeMap;

pub trait RecordSource: Send {
    fn next_record(&mut self) -> ObservationRecord;
}

/// any `FnMut() -> ObservationRecord` closure is a source
impl<F> RecordSource for F
where
    F: FnMut() -> ObservationRecord + Send,
{
    fn next_record(&mut self) -> ObservationRecord {
        self()
    }
}

/// stand-in for the tracking pipeline, always reports the same period
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedSource;

impl RecordSource for SimulatedSource {
    fn next_record(&mut self) -> ObservationRecord {
        build_record()
    }
}

/// build the simulated observation, stamped with the current local time
pub fn build_record() -> ObservationRecord {
    let vehicles_by_type: BTreeMap<String, u32> = [
        ("car", 8),
        ("truck", 3),
        ("bus", 2),
        ("motorcycle", 1),
        ("emergency", 1),
    ]
    .into_iter()
    .map(|(name, count)| (name.to_string(), count))
    .collect();

    ObservationRecord {
        bspeed: 3.566284297591931,
        cspeed: 4.540149160099617,
        mspeed: 0.0,
        tspeed: 2.3529193309909804,
        total_vehicles_counted: 15,
        vehicles_by_type,
        car_count: 8,
        truck_count: 3,
        bus_count: 2,
        motorcycle_count: 1,
        emergency_count: 1,
        vehicles_waiting: 5,
        priority_vehicles: 3,
        green_light_duration: 25,
        vehicles_per_minute: 12.0,
        anomalies: vec!["sudden_stop".to_string()],
        timestamp: Local::now().naive_local(),
    }
}
