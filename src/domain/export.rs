use super::models::WorkoutDetails;
use super::store::WorkoutStore;

pub struct CsvExporter;

impl CsvExporter {
    /// Writes the workout log to a CSV file, one row per workout in
    /// insertion order. Raw fields and the derived metric are both
    /// included; the kind-specific columns are left empty for the
    /// other kind.
    pub fn export_to_csv(store: &WorkoutStore, filename: &str) -> Result<String, String> {
        let mut writer = csv::Writer::from_path(filename).map_err(|e| e.to_string())?;

        writer
            .write_record([
                "id",
                "kind",
                "date",
                "label",
                "latitude",
                "longitude",
                "distance_km",
                "duration_min",
                "cadence_spm",
                "pace_min_per_km",
                "elevation_gain_m",
                "speed_km_per_h",
            ])
            .map_err(|e| e.to_string())?;

        for workout in store.iter() {
            let (cadence, pace, elevation, speed) = match workout.details {
                WorkoutDetails::Running { cadence_spm, pace_min_per_km } => (
                    cadence_spm.to_string(),
                    format!("{:.1}", pace_min_per_km),
                    String::new(),
                    String::new(),
                ),
                WorkoutDetails::Cycling { elevation_gain_m, speed_km_per_h } => (
                    String::new(),
                    String::new(),
                    elevation_gain_m.to_string(),
                    format!("{:.1}", speed_km_per_h),
                ),
            };

            let date = workout.created_at.to_rfc3339();
            let lat = workout.coords.lat.to_string();
            let lon = workout.coords.lon.to_string();
            let distance = workout.distance_km.to_string();
            let duration = workout.duration_min.to_string();
            writer
                .write_record([
                    workout.id.as_str(),
                    workout.kind().capitalized(),
                    date.as_str(),
                    workout.label.as_str(),
                    lat.as_str(),
                    lon.as_str(),
                    distance.as_str(),
                    duration.as_str(),
                    cadence.as_str(),
                    pace.as_str(),
                    elevation.as_str(),
                    speed.as_str(),
                ])
                .map_err(|e| e.to_string())?;
        }

        writer.flush().map_err(|e| e.to_string())?;
        Ok(filename.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, Workout};

    #[test]
    fn test_export_writes_one_row_per_workout() {
        let mut store = WorkoutStore::new();
        store.add(Workout::running(Coordinates::new(51.5, -0.1), 5.0, 30.0, 160.0).unwrap());
        store.add(Workout::cycling(Coordinates::new(47.2, 9.5), 20.0, 60.0, 150.0).unwrap());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let filename = path.to_str().unwrap();

        let result = CsvExporter::export_to_csv(&store, filename);
        assert_eq!(result, Ok(filename.to_string()));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3); // header + 2 rows
        assert!(lines[0].starts_with("id,kind,date,label"));
        assert!(lines[1].contains("Running"));
        assert!(lines[1].contains("6.0")); // pace for 30 min / 5 km
        assert!(lines[2].contains("Cycling"));
        assert!(lines[2].contains("20.0")); // speed for 20 km / 60 min
    }

    #[test]
    fn test_export_to_bad_path_reports_error() {
        let store = WorkoutStore::new();
        let result = CsvExporter::export_to_csv(&store, "/no/such/dir/log.csv");
        assert!(result.is_err());
    }
}
