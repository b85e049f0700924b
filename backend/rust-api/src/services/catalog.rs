use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;

use crate::error::EngineError;
use crate::models::catalog::{Exercise, Unit};

/// Read-only view of the exercise/unit catalog maintained elsewhere in the
/// platform. The engine only needs metadata resolution, never writes.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn get_exercise(&self, exercise_id: &str) -> Result<Exercise, EngineError>;
    async fn get_unit(&self, unit_id: &str) -> Result<Unit, EngineError>;
}

/// Student directory collaborator; only existence checks are consumed here.
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    async fn student_exists(&self, student_id: &str) -> Result<bool, EngineError>;
}

/// Seed file format for local/dev deployments and tests.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub students: Vec<String>,
}

pub struct InMemoryCatalog {
    exercises: RwLock<HashMap<String, Exercise>>,
    units: RwLock<HashMap<String, Unit>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            exercises: RwLock::new(HashMap::new()),
            units: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert_exercise(&self, exercise: Exercise) {
        self.exercises.write().insert(exercise.id.clone(), exercise);
    }

    pub fn insert_unit(&self, unit: Unit) {
        self.units.write().insert(unit.id.clone(), unit);
    }

    pub fn load_seed(&self, seed: &CatalogSeed) {
        for exercise in &seed.exercises {
            self.insert_exercise(exercise.clone());
        }
        for unit in &seed.units {
            self.insert_unit(unit.clone());
        }
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogReader for InMemoryCatalog {
    async fn get_exercise(&self, exercise_id: &str) -> Result<Exercise, EngineError> {
        self.exercises
            .read()
            .get(exercise_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found(format!("exercise {exercise_id}")))
    }

    async fn get_unit(&self, unit_id: &str) -> Result<Unit, EngineError> {
        self.units
            .read()
            .get(unit_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found(format!("unit {unit_id}")))
    }
}

pub struct InMemoryDirectory {
    students: RwLock<HashSet<String>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self {
            students: RwLock::new(HashSet::new()),
        }
    }

    pub fn add_student(&self, student_id: &str) {
        self.students.write().insert(student_id.to_string());
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StudentDirectory for InMemoryDirectory {
    async fn student_exists(&self, student_id: &str) -> Result<bool, EngineError> {
        Ok(self.students.read().contains(student_id))
    }
}
