#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use temperature_service::api::{Outcome, TemperatureApi};
use temperature_service::db::TemperatureStore;
use temperature_service::errors::{Error, Result};
use temperature_service::model::{timestamp_now, InputTemperature, Temperature, TemperatureRequest};
use tokio::sync::Mutex;

/// In-memory store with the same contract as the PostgreSQL one: rows keep
/// insertion order, duplicates conflict, update/delete read before writing.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Temperature>>,
    broken: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation fails as if the pool were exhausted.
    pub fn broken() -> Self {
        Self {
            rows: Mutex::default(),
            broken: true,
        }
    }

    pub async fn rows(&self) -> Vec<Temperature> {
        self.rows.lock().await.clone()
    }

    fn check(&self) -> Result<()> {
        if self.broken {
            return Err(Error::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl TemperatureStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<Temperature>> {
        self.check()?;
        Ok(self.rows.lock().await.clone())
    }

    async fn fetch_one(&self, id: i32) -> Result<Temperature> {
        self.check()?;
        self.rows
            .lock()
            .await
            .iter()
            .find(|t| t.id() == id)
            .cloned()
            .ok_or(Error::NotFound(id))
    }

    async fn insert(&self, input: &InputTemperature) -> Result<Temperature> {
        self.check()?;
        let mut rows = self.rows.lock().await;
        if rows.iter().any(|t| t.id() == input.id) {
            return Err(Error::Conflict(input.id));
        }
        let temperature = Temperature::create(input, timestamp_now());
        rows.push(temperature.clone());
        Ok(temperature)
    }

    async fn update(&self, input: &InputTemperature) -> Result<Temperature> {
        self.check()?;
        let mut rows = self.rows.lock().await;
        let temperature = rows
            .iter_mut()
            .find(|t| t.id() == input.id)
            .ok_or(Error::NotFound(input.id))?;
        temperature.apply(input, timestamp_now());
        Ok(temperature.clone())
    }

    async fn delete(&self, id: i32) -> Result<Temperature> {
        self.check()?;
        let mut rows = self.rows.lock().await;
        let position = rows
            .iter()
            .position(|t| t.id() == id)
            .ok_or(Error::NotFound(id))?;
        Ok(rows.remove(position))
    }
}

pub fn api_with(store: Arc<MemoryStore>) -> TemperatureApi {
    TemperatureApi::new(store)
}

pub fn request(id: i32, value: i32, unit: i64) -> TemperatureRequest {
    TemperatureRequest {
        id: Some(id),
        value: Some(value),
        unit: Some(unit),
    }
}

pub fn expect_ok<T: std::fmt::Debug>(outcome: Outcome<T>) -> T {
    match outcome {
        Outcome::Ok(value) => value,
        other => panic!("expected Ok, got {:?}", other),
    }
}

pub fn expect_created<T: std::fmt::Debug>(outcome: Outcome<T>) -> (T, i32) {
    match outcome {
        Outcome::Created {
            record,
            location_id,
        } => (record, location_id),
        other => panic!("expected Created, got {:?}", other),
    }
}

/// Lets the clock move past the previous microsecond-truncated timestamp.
pub async fn tick() {
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
}
