use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Measurement unit of a temperature value, `1`/`2`/`3` on the wire and in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(try_from = "i16", into = "i16")]
#[repr(i16)]
pub enum TemperatureUnit {
    Celsius = 1,
    Fahrenheit = 2,
    Kelvin = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidUnit(pub i64);

impl fmt::Display for InvalidUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unit {} is not one of 1 (C), 2 (F), 3 (K)",
            self.0
        )
    }
}

impl TryFrom<i64> for TemperatureUnit {
    type Error = InvalidUnit;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TemperatureUnit::Celsius),
            2 => Ok(TemperatureUnit::Fahrenheit),
            3 => Ok(TemperatureUnit::Kelvin),
            other => Err(InvalidUnit(other)),
        }
    }
}

impl TryFrom<i16> for TemperatureUnit {
    type Error = InvalidUnit;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        TemperatureUnit::try_from(i64::from(value))
    }
}

impl From<TemperatureUnit> for i16 {
    fn from(unit: TemperatureUnit) -> Self {
        unit as i16
    }
}

/// Inbound create/update body exactly as decoded, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemperatureRequest {
    pub id: Option<i32>,
    pub value: Option<i32>,
    pub unit: Option<i64>,
}

/// Validated mutation payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputTemperature {
    pub id: i32,
    pub value: i32,
    pub unit: TemperatureUnit,
}

/// Persisted temperature entry.
///
/// `id` and `created_date` are fixed when the entry is built from an
/// [`InputTemperature`]; afterwards only [`Temperature::apply`] mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Temperature {
    id: i32,
    value: i32,
    unit: TemperatureUnit,
    created_date: DateTime<Utc>,
    last_updated_date: DateTime<Utc>,
}

impl Temperature {
    pub fn create(input: &InputTemperature, now: DateTime<Utc>) -> Self {
        Self {
            id: input.id,
            value: input.value,
            unit: input.unit,
            created_date: now,
            last_updated_date: now,
        }
    }

    /// Overwrites value and unit and stamps `last_updated_date`. The payload id is not consulted.
    pub fn apply(&mut self, input: &InputTemperature, now: DateTime<Utc>) {
        self.value = input.value;
        self.unit = input.unit;
        self.last_updated_date = now.max(self.created_date);
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    pub fn last_updated_date(&self) -> DateTime<Utc> {
        self.last_updated_date
    }
}

/// Current UTC time truncated to microseconds, the finest precision the store keeps.
pub fn timestamp_now() -> DateTime<Utc> {
    truncate_to_micros(Utc::now())
}

pub fn truncate_to_micros(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(6)
}
