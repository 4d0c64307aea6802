use crate::db::TemperatureStore;
use crate::errors::Error;
use crate::metrics::{record_outcome, STORAGE_ERRORS_TOTAL};
use crate::model::{InputTemperature, Temperature, TemperatureRequest, TemperatureUnit};
use crate::validate::validate;
use std::sync::Arc;
use tracing::error;

const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred while processing the request.";

/// Result of an API operation, independent of the transport that reports it.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ok(T),
    /// A new record; `location_id` re-fetches it through [`TemperatureApi::get_by_id`].
    Created { record: T, location_id: i32 },
    BadInput(String),
    NotFound(String),
    Conflict(String),
    InternalError(String),
}

impl<T> Outcome<T> {
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Ok(_) => "ok",
            Outcome::Created { .. } => "created",
            Outcome::BadInput(_) => "bad_input",
            Outcome::NotFound(_) => "not_found",
            Outcome::Conflict(_) => "conflict",
            Outcome::InternalError(_) => "internal_error",
        }
    }
}

/// Request-to-storage mapping for temperature records.
#[derive(Clone)]
pub struct TemperatureApi {
    store: Arc<dyn TemperatureStore>,
}

impl TemperatureApi {
    pub fn new(store: Arc<dyn TemperatureStore>) -> Self {
        Self { store }
    }

    /// All records, with every Fahrenheit record emitted twice in a row.
    pub async fn list(&self) -> Outcome<Vec<Temperature>> {
        let outcome = match self.store.fetch_all().await {
            Ok(temperatures) => Outcome::Ok(with_fahrenheit_duplicated(temperatures)),
            Err(e) => failure("list", e),
        };
        finish("list", outcome)
    }

    pub async fn get_by_id(&self, id: i32) -> Outcome<Temperature> {
        let outcome = match self.store.fetch_one(id).await {
            Ok(temperature) => Outcome::Ok(temperature),
            Err(e) => failure("get_by_id", e),
        };
        finish("get_by_id", outcome)
    }

    pub async fn create(&self, request: &TemperatureRequest) -> Outcome<Temperature> {
        let outcome = match validate(request) {
            Ok(input) => self.insert("create", &input).await,
            Err(e) => failure("create", e),
        };
        finish("create", outcome)
    }

    /// Update, falling back to create when the id has no row.
    pub async fn upsert(&self, request: &TemperatureRequest) -> Outcome<Temperature> {
        let input = match validate(request) {
            Ok(input) => input,
            Err(e) => return finish("upsert", failure("upsert", e)),
        };

        let outcome = match self.store.update(&input).await {
            Ok(temperature) => Outcome::Ok(temperature),
            Err(Error::NotFound(_)) => self.insert("upsert", &input).await,
            Err(e) => failure("upsert", e),
        };
        finish("upsert", outcome)
    }

    pub async fn delete(&self, id: i32) -> Outcome<Temperature> {
        let outcome = match self.store.delete(id).await {
            Ok(temperature) => Outcome::Ok(temperature),
            Err(e) => failure("delete", e),
        };
        finish("delete", outcome)
    }

    async fn insert(&self, operation: &str, input: &InputTemperature) -> Outcome<Temperature> {
        match self.store.insert(input).await {
            Ok(temperature) => Outcome::Created {
                location_id: temperature.id(),
                record: temperature,
            },
            Err(e) => failure(operation, e),
        }
    }
}

fn with_fahrenheit_duplicated(temperatures: Vec<Temperature>) -> Vec<Temperature> {
    let mut out = Vec::with_capacity(temperatures.len());
    for temperature in temperatures {
        if temperature.unit() == TemperatureUnit::Fahrenheit {
            out.push(temperature.clone());
        }
        out.push(temperature);
    }
    out
}

/// Expected conditions echo their message; anything else is logged and hidden.
fn failure<T>(operation: &str, err: Error) -> Outcome<T> {
    match err {
        Error::Validation(msg) => Outcome::BadInput(msg),
        e @ Error::NotFound(_) => Outcome::NotFound(e.to_string()),
        e @ Error::Conflict(_) => Outcome::Conflict(e.to_string()),
        e => {
            if matches!(e, Error::Database(_)) {
                STORAGE_ERRORS_TOTAL.inc();
            }
            error!("Error caught in {}: {}", operation, e);
            Outcome::InternalError(INTERNAL_ERROR_MESSAGE.to_string())
        }
    }
}

fn finish<T>(operation: &str, outcome: Outcome<T>) -> Outcome<T> {
    record_outcome(operation, outcome.kind());
    outcome
}
