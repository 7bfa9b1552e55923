use super::models::{Workout, WorkoutRecord};

/// The ordered collection of workouts for one session.
///
/// Insertion order is creation order and is preserved through the
/// persistence round trip. The store is owned by the application state
/// and only mutated from there.
#[derive(Debug, Default)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a workout. Ids are generated, so duplicates are not
    /// defended against here.
    pub fn add(&mut self, workout: Workout) {
        self.workouts.push(workout);
    }

    /// Looks a workout up by id. Linear scan; the collection is
    /// session-local and small.
    pub fn find_by_id(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&Workout> {
        self.workouts.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Workout> {
        self.workouts.iter()
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    /// Structural snapshot of every workout's raw fields, in order.
    pub fn to_records(&self) -> Vec<WorkoutRecord> {
        self.workouts.iter().map(Workout::to_record).collect()
    }

    /// Replaces the contents wholesale with records read back from
    /// storage, keeping their original order. Records are trusted;
    /// derived values are recomputed during the rebuild.
    pub fn restore(&mut self, records: Vec<WorkoutRecord>) {
        self.workouts = records.into_iter().map(Workout::from_record).collect();
    }

    pub fn clear(&mut self) {
        self.workouts.clear();
    }
}
