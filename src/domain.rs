use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// one observation period as reported to the backend
///
/// field names are the wire names; the backend expects this exact shape.
/// the per-type `*_count` fields duplicate `vehicles_by_type` and are not
/// kept in sync by construction (see `counts_agree`).
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ObservationRecord {
    /// average bus speed
    pub bspeed: f64,
    /// average car speed
    pub cspeed: f64,
    /// average motorcycle speed
    pub mspeed: f64,
    /// average truck speed
    pub tspeed: f64,

    pub total_vehicles_counted: u32,

    /// type name -> count (e.g. "car" -> 8)
    pub vehicles_by_type: BTreeMap<String, u32>,

    pub car_count: u32,
    pub truck_count: u32,
    pub bus_count: u32,
    pub motorcycle_count: u32,
    pub emergency_count: u32,

    /// queue length at observation time
    pub vehicles_waiting: u32,
    pub priority_vehicles: u32,
    /// signal timing decision, in seconds
    pub green_light_duration: u32,
    /// whole rates go out as json integers (`12`, not `12.0`)
    #[serde(serialize_with = "serialize_rate")]
    pub vehicles_per_minute: f64,

    /// anomaly tags in detection order (e.g. "sudden_stop")
    pub anomalies: Vec<String>,

    /// local wall-clock time the record was generated
    pub timestamp: NaiveDateTime,
}

fn serialize_rate<S: Serializer>(rate: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    let whole = rate.trunc();
    if rate.is_finite() && whole == *rate && whole.abs() < i64::MAX as f64 {
        serializer.serialize_i64(whole as i64)
    } else {
        serializer.serialize_f64(*rate)
    }
}

impl ObservationRecord {
    /// true when the denormalized counts match the breakdown and the
    /// breakdown sums to `total_vehicles_counted`
    pub fn counts_agree(&self) -> bool {
        let by_type = |name: &str| self.vehicles_by_type.get(name).copied().unwrap_or(0);

        let fields_match = by_type("car") == self.car_count
            && by_type("truck") == self.truck_count
            && by_type("bus") == self.bus_count
            && by_type("motorcycle") == self.motorcycle_count
            && by_type("emergency") == self.emergency_count;

        let sum: u64 = self.vehicles_by_type.values().map(|&n| u64::from(n)).sum();

        fields_match && sum == u64::from(self.total_vehicles_counted)
    }
}
