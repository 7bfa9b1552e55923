//! Application state management for the terminal workout tracker.
//!
//! This module contains the session controller: the mode state machine,
//! the pending map location, the entry form buffers, and the map
//! viewport used to translate between terminal cells and coordinates.

use crate::domain::{Coordinates, CsvExporter, Workout, WorkoutKind, WorkoutStore};
use crate::domain::errors::{DomainError, DomainResult};
use crate::infrastructure::{KeyValueStore, WorkoutRepository, WORKOUTS_KEY};
use std::time::{Duration, Instant};

/// Map center used when geolocation is unavailable.
pub const DEFAULT_CENTER: Coordinates = Coordinates { lat: 51.505, lon: -0.09 };

/// Initial viewport zoom step.
pub const DEFAULT_ZOOM: u32 = 13;

/// How long a transient confirmation stays in the status bar.
const STATUS_TTL: Duration = Duration::from_secs(1);

/// Represents the current mode of the application.
///
/// The application can be in different modes that determine how user input
/// is interpreted and what UI elements are displayed.
#[derive(Debug)]
pub enum AppMode {
    /// Browsing mode - list navigation, map clicks, shortcuts available
    Browsing,
    /// Entry form is open - a map location is pending, user fills fields
    EntryForm,
    /// Help screen is displayed
    Help,
    /// CSV export dialog is open
    ExportCsv,
}

/// Fields of the entry form, in focus-cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Kind,
    Distance,
    Duration,
    Extra,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Kind => FormField::Distance,
            FormField::Distance => FormField::Duration,
            FormField::Duration => FormField::Extra,
            FormField::Extra => FormField::Kind,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            FormField::Kind => FormField::Extra,
            FormField::Distance => FormField::Kind,
            FormField::Duration => FormField::Distance,
            FormField::Extra => FormField::Duration,
        }
    }
}

/// Main application state containing the workout log and UI state.
///
/// This is the single owner of the workout store and the pending
/// location; every mutation runs to completion inside one event before
/// the next is processed, so no further synchronization is needed.
pub struct App {
    /// The workout collection for this session
    pub store: WorkoutStore,
    /// Current application mode
    pub mode: AppMode,
    /// Map location captured by a click, awaiting form submission
    pub pending_location: Option<Coordinates>,
    /// Kind selected in the entry form
    pub form_kind: WorkoutKind,
    /// Distance field buffer (km)
    pub distance_input: String,
    /// Duration field buffer (min)
    pub duration_input: String,
    /// Kind-specific field buffer (cadence in spm, or elevation gain in m)
    pub extra_input: String,
    /// Which form field currently has focus
    pub focused_field: FormField,
    /// Cursor position within the focused text buffer
    pub cursor_position: usize,
    /// Input buffer for the CSV export filename
    pub filename_input: String,
    /// Center of the map viewport
    pub map_center: Coordinates,
    /// Zoom step; each step halves the visible latitude span
    pub map_zoom: u32,
    /// Inner map panel as (x, y, width, height), recorded at render time
    pub map_area: Option<(u16, u16, u16, u16)>,
    /// Currently selected list item
    pub selected_index: Option<usize>,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// When a transient status message expires
    pub status_deadline: Option<Instant>,
    /// Scroll position in help text
    pub help_scroll: usize,
    storage: Box<dyn KeyValueStore>,
}

impl App {
    /// Constructs the application state, rebuilding the workout store
    /// from persisted storage.
    ///
    /// An absent key starts an empty log. An unparsable value also
    /// starts empty, but the error is surfaced as a startup status
    /// message rather than silently discarded; the stored value is
    /// left untouched.
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        let mut app = Self {
            store: WorkoutStore::new(),
            mode: AppMode::Browsing,
            pending_location: None,
            form_kind: WorkoutKind::Running,
            distance_input: String::new(),
            duration_input: String::new(),
            extra_input: String::new(),
            focused_field: FormField::Distance,
            cursor_position: 0,
            filename_input: String::new(),
            map_center: DEFAULT_CENTER,
            map_zoom: DEFAULT_ZOOM,
            map_area: None,
            selected_index: None,
            status_message: None,
            status_deadline: None,
            help_scroll: 0,
            storage,
        };

        match WorkoutRepository::load(app.storage.as_ref()) {
            Ok(records) => {
                app.store.restore(records);
                if !app.store.is_empty() {
                    app.selected_index = Some(0);
                }
            }
            Err(error) => {
                app.status_message =
                    Some(format!("{} - starting with an empty log", error));
            }
        }

        app
    }

    /// Read access to the storage backend, mainly for inspection in tests.
    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    /// Handles a map click: captures the location and opens the entry
    /// form. A second click while the form is already open just moves
    /// the pending location; typed field values survive.
    pub fn on_location_picked(&mut self, coords: Coordinates) {
        let already_open = matches!(self.mode, AppMode::EntryForm);
        self.pending_location = Some(coords);
        if !already_open {
            self.clear_form_fields();
            self.focused_field = FormField::Distance;
            self.mode = AppMode::EntryForm;
            self.status_message = None;
        }
    }

    /// Completes the pending entry from the form buffers.
    ///
    /// On validation failure the form stays open with its contents and
    /// the pending location intact, and the error becomes the status
    /// message; neither the store nor storage is touched. On success
    /// the workout is appended, persisted under the fixed key, the map
    /// recenters on the new marker, and the form closes.
    pub fn submit_entry(&mut self) {
        let Some(coords) = self.pending_location else {
            return;
        };

        let workout = match self.build_workout(coords) {
            Ok(workout) => workout,
            Err(error) => {
                self.status_message = Some(error.to_string());
                return;
            }
        };

        let label = workout.label.clone();
        self.store.add(workout);

        if let Err(error) = WorkoutRepository::save(self.storage.as_mut(), &self.store) {
            self.status_message = Some(format!("Save failed: {}", error));
        } else {
            self.set_transient_status(format!("Logged: {}", label));
        }

        self.selected_index = Some(self.store.len() - 1);
        self.map_center = coords;
        self.clear_form_fields();
        self.pending_location = None;
        self.mode = AppMode::Browsing;
    }

    fn build_workout(&self, coords: Coordinates) -> DomainResult<Workout> {
        let distance = parse_field("distance", &self.distance_input)?;
        let duration = parse_field("duration", &self.duration_input)?;
        match self.form_kind {
            WorkoutKind::Running => {
                let cadence = parse_field("cadence", &self.extra_input)?;
                Workout::running(coords, distance, duration, cadence)
            }
            WorkoutKind::Cycling => {
                let elevation = parse_field("elevation gain", &self.extra_input)?;
                Workout::cycling(coords, distance, duration, elevation)
            }
        }
    }

    /// Cancels the open entry form without touching the store or
    /// storage. Consumes the pending location.
    pub fn cancel_entry(&mut self) {
        self.pending_location = None;
        self.clear_form_fields();
        self.mode = AppMode::Browsing;
    }

    /// Switches the form between Running and Cycling. The kind-specific
    /// field changes meaning, so its buffer is cleared.
    pub fn toggle_form_kind(&mut self) {
        self.form_kind = match self.form_kind {
            WorkoutKind::Running => WorkoutKind::Cycling,
            WorkoutKind::Cycling => WorkoutKind::Running,
        };
        self.extra_input.clear();
        if self.focused_field == FormField::Extra {
            self.cursor_position = 0;
        }
    }

    pub fn focus_next_field(&mut self) {
        self.focused_field = self.focused_field.next();
        self.cursor_position = self.focused_input().map_or(0, |s| s.len());
    }

    pub fn focus_previous_field(&mut self) {
        self.focused_field = self.focused_field.previous();
        self.cursor_position = self.focused_input().map_or(0, |s| s.len());
    }

    /// The text buffer behind the focused field, if it is a text field.
    pub fn focused_input(&self) -> Option<&String> {
        match self.focused_field {
            FormField::Kind => None,
            FormField::Distance => Some(&self.distance_input),
            FormField::Duration => Some(&self.duration_input),
            FormField::Extra => Some(&self.extra_input),
        }
    }

    pub fn focused_input_mut(&mut self) -> Option<&mut String> {
        match self.focused_field {
            FormField::Kind => None,
            FormField::Distance => Some(&mut self.distance_input),
            FormField::Duration => Some(&mut self.duration_input),
            FormField::Extra => Some(&mut self.extra_input),
        }
    }

    fn clear_form_fields(&mut self) {
        self.distance_input.clear();
        self.duration_input.clear();
        self.extra_input.clear();
        self.cursor_position = 0;
        self.focused_field = FormField::Distance;
    }

    /// Resolves a list-item activation back to its map coordinates.
    /// An unknown id is a no-op.
    pub fn focus_workout(&mut self, id: &str) {
        if let Some(workout) = self.store.find_by_id(id) {
            self.map_center = workout.coords;
        }
    }

    /// Recenters the map on the currently selected list item.
    pub fn activate_selected(&mut self) {
        let id = self
            .selected_index
            .and_then(|i| self.store.get(i))
            .map(|w| w.id.clone());
        if let Some(id) = id {
            self.focus_workout(&id);
        }
    }

    pub fn move_selection_up(&mut self) {
        if let Some(index) = self.selected_index {
            if index > 0 {
                self.selected_index = Some(index - 1);
            }
        } else if !self.store.is_empty() {
            self.selected_index = Some(0);
        }
    }

    pub fn move_selection_down(&mut self) {
        match self.selected_index {
            Some(index) if index + 1 < self.store.len() => {
                self.selected_index = Some(index + 1);
            }
            None if !self.store.is_empty() => {
                self.selected_index = Some(0);
            }
            _ => {}
        }
    }

    /// Deletes the persisted key and empties the in-memory store,
    /// resetting the presentation to its initial state.
    pub fn reset(&mut self) {
        if let Err(error) = self.storage.remove(WORKOUTS_KEY) {
            self.status_message = Some(format!("Reset failed: {}", error));
            return;
        }
        self.store.clear();
        self.selected_index = None;
        self.pending_location = None;
        self.mode = AppMode::Browsing;
        self.set_transient_status("Workout log cleared".to_string());
    }

    /// Switches to CSV export mode to prompt for a filename.
    pub fn start_csv_export(&mut self) {
        self.mode = AppMode::ExportCsv;
        self.filename_input = "workouts.csv".to_string();
        self.cursor_position = self.filename_input.len();
        self.status_message = None;
    }

    /// Gets the filename to use for CSV export.
    pub fn get_csv_export_filename(&self) -> String {
        if self.filename_input.is_empty() {
            "workouts.csv".to_string()
        } else {
            self.filename_input.clone()
        }
    }

    /// Runs the CSV export with the entered filename and reports the
    /// outcome in the status bar. Returns to browsing mode.
    pub fn finish_csv_export(&mut self) {
        let filename = self.get_csv_export_filename();
        match CsvExporter::export_to_csv(&self.store, &filename) {
            Ok(filename) => {
                self.status_message = Some(format!("Exported to {}", filename));
            }
            Err(error) => {
                self.status_message = Some(format!("Export failed: {}", error));
            }
        }
        self.mode = AppMode::Browsing;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// Cancels filename input and returns to browsing mode.
    pub fn cancel_csv_export(&mut self) {
        self.mode = AppMode::Browsing;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    fn set_transient_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_deadline = Some(Instant::now() + STATUS_TTL);
    }

    /// Expires transient status messages. Called from the event loop on
    /// every poll timeout; this is the only timer in the application.
    pub fn tick(&mut self) {
        if let Some(deadline) = self.status_deadline {
            if Instant::now() >= deadline {
                self.status_message = None;
                self.status_deadline = None;
            }
        }
    }

    /// Visible latitude span for a zoom step; halves per step.
    fn lat_span(zoom: u32) -> f64 {
        180.0 / f64::from(2u32.saturating_pow(zoom.min(30)))
    }

    /// Converts a terminal cell inside the map panel to coordinates
    /// under the current viewport. Returns `None` outside the panel.
    pub fn map_cell_to_coords(&self, column: u16, row: u16) -> Option<Coordinates> {
        let (x, y, width, height) = self.map_area?;
        if width == 0 || height == 0 {
            return None;
        }
        if column < x || column >= x + width || row < y || row >= y + height {
            return None;
        }

        let lat_span = Self::lat_span(self.map_zoom);
        let lon_span = lat_span * 2.0; // terminal cells are roughly 2:1
        let dx = f64::from(column - x) + 0.5;
        let dy = f64::from(row - y) + 0.5;
        let lat = self.map_center.lat + lat_span / 2.0 - dy * lat_span / f64::from(height);
        let lon = self.map_center.lon - lon_span / 2.0 + dx * lon_span / f64::from(width);
        Some(Coordinates::new(lat, lon))
    }

    /// Converts coordinates to the terminal cell they fall in, or
    /// `None` when they are outside the current viewport.
    pub fn coords_to_map_cell(&self, coords: Coordinates) -> Option<(u16, u16)> {
        let (x, y, width, height) = self.map_area?;
        if width == 0 || height == 0 {
            return None;
        }

        let lat_span = Self::lat_span(self.map_zoom);
        let lon_span = lat_span * 2.0;
        let col = (coords.lon - (self.map_center.lon - lon_span / 2.0)) * f64::from(width)
            / lon_span;
        let row = (self.map_center.lat + lat_span / 2.0 - coords.lat) * f64::from(height)
            / lat_span;
        if col < 0.0 || row < 0.0 || col >= f64::from(width) || row >= f64::from(height) {
            return None;
        }
        Some((x + col as u16, y + row as u16))
    }
}

fn parse_field(field: &'static str, text: &str) -> DomainResult<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| DomainError::NotANumber(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStore;
    use chrono::{Datelike, Utc};

    fn test_app() -> App {
        App::new(Box::new(MemoryStore::new()))
    }

    fn fill_form(app: &mut App, distance: &str, duration: &str, extra: &str) {
        app.distance_input = distance.to_string();
        app.duration_input = duration.to_string();
        app.extra_input = extra.to_string();
    }

    #[test]
    fn test_location_pick_opens_form() {
        let mut app = test_app();
        assert!(matches!(app.mode, AppMode::Browsing));

        app.on_location_picked(Coordinates::new(51.5, -0.1));

        assert!(matches!(app.mode, AppMode::EntryForm));
        assert_eq!(app.pending_location, Some(Coordinates::new(51.5, -0.1)));
        assert_eq!(app.focused_field, FormField::Distance);
    }

    #[test]
    fn test_second_pick_replaces_pending_and_keeps_inputs() {
        let mut app = test_app();
        app.on_location_picked(Coordinates::new(51.5, -0.1));
        fill_form(&mut app, "5", "30", "160");

        app.on_location_picked(Coordinates::new(48.8, 2.35));

        assert!(matches!(app.mode, AppMode::EntryForm));
        assert_eq!(app.pending_location, Some(Coordinates::new(48.8, 2.35)));
        assert_eq!(app.distance_input, "5");
        assert_eq!(app.duration_input, "30");
        assert_eq!(app.extra_input, "160");
    }

    #[test]
    fn test_submit_running_entry() {
        let mut app = test_app();
        app.on_location_picked(Coordinates::new(51.5, -0.1));
        fill_form(&mut app, "5", "30", "160");

        app.submit_entry();

        assert!(matches!(app.mode, AppMode::Browsing));
        assert_eq!(app.pending_location, None);
        assert_eq!(app.store.len(), 1);
        assert_eq!(app.selected_index, Some(0));

        let workout = app.store.get(0).unwrap();
        assert_eq!(workout.coords, Coordinates::new(51.5, -0.1));
        match workout.details {
            crate::domain::WorkoutDetails::Running { pace_min_per_km, .. } => {
                assert_eq!(pace_min_per_km, 6.0);
            }
            _ => panic!("expected running details"),
        }

        // Label carries the current month and day
        let now = Utc::now();
        assert!(workout.label.starts_with("Running on "));
        assert!(workout.label.ends_with(&now.day().to_string()));

        // Map recentered on the new marker
        assert_eq!(app.map_center, Coordinates::new(51.5, -0.1));

        // Persisted synchronously and round-trips
        let records = WorkoutRepository::load(app.storage()).unwrap();
        assert_eq!(records, app.store.to_records());
    }

    #[test]
    fn test_submit_cycling_entry() {
        let mut app = test_app();
        app.form_kind = WorkoutKind::Cycling;
        app.on_location_picked(Coordinates::new(47.2, 9.5));
        fill_form(&mut app, "20", "60", "150");

        app.submit_entry();

        assert_eq!(app.store.len(), 1);
        match app.store.get(0).unwrap().details {
            crate::domain::WorkoutDetails::Cycling { speed_km_per_h, .. } => {
                assert_eq!(speed_km_per_h, 20.0);
            }
            _ => panic!("expected cycling details"),
        }
    }

    #[test]
    fn test_submit_rejects_negative_distance() {
        let mut app = test_app();
        app.on_location_picked(Coordinates::new(51.5, -0.1));
        fill_form(&mut app, "-1", "30", "160");

        app.submit_entry();

        // Form stays open with everything intact, nothing written
        assert!(matches!(app.mode, AppMode::EntryForm));
        assert_eq!(app.pending_location, Some(Coordinates::new(51.5, -0.1)));
        assert_eq!(app.distance_input, "-1");
        assert_eq!(app.store.len(), 0);
        assert!(app.storage().get(WORKOUTS_KEY).is_none());
        assert_eq!(
            app.status_message.as_deref(),
            Some("The distance has to be a positive number!")
        );
    }

    #[test]
    fn test_submit_rejects_non_numeric_input() {
        let mut app = test_app();
        app.on_location_picked(Coordinates::new(51.5, -0.1));
        fill_form(&mut app, "5", "abc", "160");

        app.submit_entry();

        assert!(matches!(app.mode, AppMode::EntryForm));
        assert_eq!(app.store.len(), 0);
        assert_eq!(
            app.status_message.as_deref(),
            Some("The duration has to be a number!")
        );
    }

    #[test]
    fn test_submit_without_pending_location_is_noop() {
        let mut app = test_app();
        fill_form(&mut app, "5", "30", "160");
        app.submit_entry();
        assert_eq!(app.store.len(), 0);
    }

    #[test]
    fn test_cancel_consumes_pending_without_writing() {
        let mut app = test_app();
        app.on_location_picked(Coordinates::new(51.5, -0.1));
        fill_form(&mut app, "5", "30", "160");

        app.cancel_entry();

        assert!(matches!(app.mode, AppMode::Browsing));
        assert_eq!(app.pending_location, None);
        assert!(app.distance_input.is_empty());
        assert!(app.storage().get(WORKOUTS_KEY).is_none());
    }

    #[test]
    fn test_startup_restores_persisted_entries_in_order() {
        let mut storage = MemoryStore::new();
        let mut original = WorkoutStore::new();
        original.add(Workout::running(Coordinates::new(51.5, -0.1), 5.0, 30.0, 160.0).unwrap());
        original.add(Workout::cycling(Coordinates::new(47.2, 9.5), 20.0, 60.0, 150.0).unwrap());
        WorkoutRepository::save(&mut storage, &original).unwrap();

        let app = App::new(Box::new(storage));

        assert_eq!(app.store.len(), 2);
        let ids: Vec<&str> = app.store.iter().map(|w| w.id.as_str()).collect();
        let original_ids: Vec<&str> = original.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, original_ids);
        assert_eq!(app.selected_index, Some(0));
    }

    #[test]
    fn test_startup_with_corrupt_storage_reports_and_starts_empty() {
        let mut storage = MemoryStore::new();
        storage.set(WORKOUTS_KEY, "{not json").unwrap();

        let app = App::new(Box::new(storage));

        assert!(app.store.is_empty());
        let message = app.status_message.as_deref().unwrap();
        assert!(message.contains("Invalid stored workouts"));
        // The stored value is left in place for inspection
        assert!(app.storage().get(WORKOUTS_KEY).is_some());
    }

    #[test]
    fn test_reset_clears_store_and_storage() {
        let mut app = test_app();
        app.on_location_picked(Coordinates::new(51.5, -0.1));
        fill_form(&mut app, "5", "30", "160");
        app.submit_entry();
        assert!(app.storage().get(WORKOUTS_KEY).is_some());

        app.reset();

        assert!(app.store.is_empty());
        assert_eq!(app.selected_index, None);
        assert!(app.storage().get(WORKOUTS_KEY).is_none());
    }

    #[test]
    fn test_focus_workout_recenters_map() {
        let mut app = test_app();
        app.on_location_picked(Coordinates::new(51.5, -0.1));
        fill_form(&mut app, "5", "30", "160");
        app.submit_entry();
        app.map_center = DEFAULT_CENTER;

        let id = app.store.get(0).unwrap().id.clone();
        app.focus_workout(&id);
        assert_eq!(app.map_center, Coordinates::new(51.5, -0.1));

        // Unknown id leaves the viewport alone
        app.map_center = DEFAULT_CENTER;
        app.focus_workout("no-such-id");
        assert_eq!(app.map_center, DEFAULT_CENTER);
    }

    #[test]
    fn test_list_selection_moves_within_bounds() {
        let mut app = test_app();
        for _ in 0..2 {
            app.on_location_picked(Coordinates::new(51.5, -0.1));
            fill_form(&mut app, "5", "30", "160");
            app.submit_entry();
        }
        assert_eq!(app.selected_index, Some(1));

        app.move_selection_down();
        assert_eq!(app.selected_index, Some(1));
        app.move_selection_up();
        assert_eq!(app.selected_index, Some(0));
        app.move_selection_up();
        assert_eq!(app.selected_index, Some(0));
    }

    #[test]
    fn test_tick_expires_transient_status() {
        let mut app = test_app();
        app.status_message = Some("Logged: Running on August 23".to_string());
        app.status_deadline = Some(Instant::now());

        app.tick();

        assert_eq!(app.status_message, None);
        assert_eq!(app.status_deadline, None);
    }

    #[test]
    fn test_tick_keeps_pending_status() {
        let mut app = test_app();
        app.status_message = Some("still fresh".to_string());
        app.status_deadline = Some(Instant::now() + Duration::from_secs(60));

        app.tick();

        assert_eq!(app.status_message.as_deref(), Some("still fresh"));
    }

    #[test]
    fn test_map_projection_round_trip() {
        let mut app = test_app();
        app.map_area = Some((10, 2, 60, 20));

        let coords = app.map_cell_to_coords(25, 9).unwrap();
        let cell = app.coords_to_map_cell(coords).unwrap();
        assert_eq!(cell, (25, 9));

        // Center of the panel maps near the viewport center
        let center = app.map_cell_to_coords(10 + 30, 2 + 10).unwrap();
        assert!((center.lat - app.map_center.lat).abs() < 0.01);
        assert!((center.lon - app.map_center.lon).abs() < 0.01);
    }

    #[test]
    fn test_clicks_outside_map_are_ignored() {
        let mut app = test_app();
        app.map_area = Some((10, 2, 60, 20));

        assert!(app.map_cell_to_coords(5, 5).is_none());
        assert!(app.map_cell_to_coords(70, 5).is_none());
        assert!(app.map_cell_to_coords(25, 30).is_none());

        // No render yet: no map area at all
        app.map_area = None;
        assert!(app.map_cell_to_coords(25, 9).is_none());
    }

    #[test]
    fn test_toggle_form_kind_clears_kind_specific_field() {
        let mut app = test_app();
        app.on_location_picked(Coordinates::new(51.5, -0.1));
        app.extra_input = "160".to_string();

        app.toggle_form_kind();

        assert_eq!(app.form_kind, WorkoutKind::Cycling);
        assert!(app.extra_input.is_empty());
    }

    #[test]
    fn test_csv_export_dialog_flow() {
        let mut app = test_app();
        app.start_csv_export();
        assert!(matches!(app.mode, AppMode::ExportCsv));
        assert_eq!(app.filename_input, "workouts.csv");

        app.cancel_csv_export();
        assert!(matches!(app.mode, AppMode::Browsing));
        assert!(app.filename_input.is_empty());
    }
}
