use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    pub fn capitalized(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "Running",
            WorkoutKind::Cycling => "Cycling",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "🏃",
            WorkoutKind::Cycling => "🚴",
        }
    }

    /// Single-cell marker used on the map panel, where wide glyphs
    /// would break column alignment.
    pub fn marker(&self) -> char {
        match self {
            WorkoutKind::Running => 'R',
            WorkoutKind::Cycling => 'C',
        }
    }
}

/// Kind-specific payload of a workout. The raw field (cadence or
/// elevation gain) is recorded, the metric (pace or speed) is derived
/// once at construction and carried alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WorkoutDetails {
    Running {
        cadence_spm: f64,
        pace_min_per_km: f64,
    },
    Cycling {
        elevation_gain_m: f64,
        speed_km_per_h: f64,
    },
}

/// One logged activity session.
///
/// All fields are set at creation and never mutated afterwards. `label`
/// and the derived metric inside `details` are computed exactly once
/// from the raw fields and the creation date.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub coords: Coordinates,
    pub distance_km: f64,
    pub duration_min: f64,
    pub label: String,
    pub details: WorkoutDetails,
}

impl Workout {
    /// Creates a running workout stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns a `DomainError` if distance, duration or cadence is not
    /// a finite positive number.
    pub fn running(
        coords: Coordinates,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    ) -> DomainResult<Self> {
        Self::running_at(coords, distance_km, duration_min, cadence_spm, Utc::now())
    }

    /// Creates a running workout with an explicit creation time.
    pub fn running_at(
        coords: Coordinates,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        require_positive("distance", distance_km)?;
        require_positive("duration", duration_min)?;
        require_positive("cadence", cadence_spm)?;

        Ok(Self {
            id: next_id(),
            created_at,
            coords,
            distance_km,
            duration_min,
            label: make_label(WorkoutKind::Running, created_at),
            details: WorkoutDetails::Running {
                cadence_spm,
                pace_min_per_km: duration_min / distance_km,
            },
        })
    }

    /// Creates a cycling workout stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns a `DomainError` if distance or duration is not a finite
    /// positive number, or if the elevation gain is not finite or is
    /// negative (zero is allowed).
    pub fn cycling(
        coords: Coordinates,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    ) -> DomainResult<Self> {
        Self::cycling_at(coords, distance_km, duration_min, elevation_gain_m, Utc::now())
    }

    /// Creates a cycling workout with an explicit creation time.
    pub fn cycling_at(
        coords: Coordinates,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        require_positive("distance", distance_km)?;
        require_positive("duration", duration_min)?;
        if !elevation_gain_m.is_finite() {
            return Err(DomainError::NotFinite("elevation gain"));
        }
        if elevation_gain_m < 0.0 {
            return Err(DomainError::NegativeElevation);
        }

        Ok(Self {
            id: next_id(),
            created_at,
            coords,
            distance_km,
            duration_min,
            label: make_label(WorkoutKind::Cycling, created_at),
            details: WorkoutDetails::Cycling {
                elevation_gain_m,
                speed_km_per_h: distance_km / (duration_min / 60.0),
            },
        })
    }

    pub fn kind(&self) -> WorkoutKind {
        match self.details {
            WorkoutDetails::Running { .. } => WorkoutKind::Running,
            WorkoutDetails::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    /// Flattens the workout into its persisted form. Only raw fields
    /// are kept; derived values are recomputed by `from_record`.
    pub fn to_record(&self) -> WorkoutRecord {
        let (cadence_spm, elevation_gain_m) = match self.details {
            WorkoutDetails::Running { cadence_spm, .. } => (Some(cadence_spm), None),
            WorkoutDetails::Cycling { elevation_gain_m, .. } => (None, Some(elevation_gain_m)),
        };
        WorkoutRecord {
            id: self.id.clone(),
            kind: self.kind(),
            coords: self.coords,
            distance_km: self.distance_km,
            duration_min: self.duration_min,
            created_at: self.created_at,
            cadence_spm,
            elevation_gain_m,
        }
    }

    /// Rebuilds a workout from a persisted record.
    ///
    /// Persisted data is trusted: no validation is performed. The label
    /// and the kind-specific metric are recomputed from the raw fields,
    /// so a restored workout is indistinguishable from the one that was
    /// saved.
    pub fn from_record(record: WorkoutRecord) -> Self {
        let details = match record.kind {
            WorkoutKind::Running => WorkoutDetails::Running {
                cadence_spm: record.cadence_spm.unwrap_or(0.0),
                pace_min_per_km: record.duration_min / record.distance_km,
            },
            WorkoutKind::Cycling => WorkoutDetails::Cycling {
                elevation_gain_m: record.elevation_gain_m.unwrap_or(0.0),
                speed_km_per_h: record.distance_km / (record.duration_min / 60.0),
            },
        };
        Self {
            id: record.id,
            created_at: record.created_at,
            coords: record.coords,
            distance_km: record.distance_km,
            duration_min: record.duration_min,
            label: make_label(record.kind, record.created_at),
            details,
        }
    }
}

/// Flat persisted form of a workout: raw fields only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: String,
    pub kind: WorkoutKind,
    pub coords: Coordinates,
    pub distance_km: f64,
    pub duration_min: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence_spm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_gain_m: Option<f64>,
}

fn make_label(kind: WorkoutKind, created_at: DateTime<Utc>) -> String {
    format!(
        "{} on {} {}",
        kind.capitalized(),
        MONTHS[created_at.month0() as usize],
        created_at.day()
    )
}

fn require_positive(field: &'static str, value: f64) -> DomainResult<()> {
    if !value.is_finite() {
        return Err(DomainError::NotFinite(field));
    }
    if value <= 0.0 {
        return Err(DomainError::NotPositive(field));
    }
    Ok(())
}

// Eight decimal digits, seeded from the startup time with a counter so
// back-to-back creations within one millisecond still get distinct ids.
fn next_id() -> String {
    static BASE: OnceLock<u64> = OnceLock::new();
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let base = *BASE.get_or_init(|| Utc::now().timestamp_millis() as u64);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:08}", base.wrapping_add(n) % 100_000_000)
}
