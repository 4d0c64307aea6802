use crate::config::Config;
use crate::errors::{Error, Result};
use crate::model::{timestamp_now, InputTemperature, Temperature};
use async_trait::async_trait;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info, warn};

/// SQLSTATE raised by PostgreSQL when an insert collides with an existing key.
const UNIQUE_VIOLATION: &str = "23505";

const SELECT_ALL: &str =
    "SELECT id, value, unit, created_date, last_updated_date FROM temperatures";

const SELECT_ONE: &str =
    "SELECT id, value, unit, created_date, last_updated_date FROM temperatures WHERE id = $1";

const INSERT: &str = r#"
    INSERT INTO temperatures (id, value, unit, created_date, last_updated_date)
    VALUES ($1, $2, $3, $4, $5)
    "#;

const UPDATE: &str = r#"
    UPDATE temperatures
    SET value = $2, unit = $3, last_updated_date = $4
    WHERE id = $1
    "#;

const DELETE: &str = "DELETE FROM temperatures WHERE id = $1";

/// Storage operations over the `temperatures` table.
///
/// Implementations report failures only as [`Error::NotFound`],
/// [`Error::Conflict`] or [`Error::Database`]; store-specific codes never
/// leave the implementation.
#[async_trait]
pub trait TemperatureStore: Send + Sync {
    /// Every row, in whatever order the store yields them.
    async fn fetch_all(&self) -> Result<Vec<Temperature>>;

    async fn fetch_one(&self, id: i32) -> Result<Temperature>;

    /// Stamps both timestamps with the current time and inserts. A duplicate id is a conflict.
    async fn insert(&self, input: &InputTemperature) -> Result<Temperature>;

    /// Loads the existing row, overwrites value, unit and `last_updated_date`, writes it back.
    async fn update(&self, input: &InputTemperature) -> Result<Temperature>;

    /// Loads the existing row, deletes it and returns what was deleted.
    async fn delete(&self, id: i32) -> Result<Temperature>;
}

pub async fn make_pool(config: &Config) -> Result<PgPool> {
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .connect(&config.database_url)
        .await?;

    info!("Database connection established");
    Ok(pool)
}

/// PostgreSQL-backed store. Each operation holds one pooled connection for its
/// whole unit of work; the connection goes back to the pool when the guard drops.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemperatureStore for PgStore {
    async fn fetch_all(&self) -> Result<Vec<Temperature>> {
        let mut conn = self.pool.acquire().await?;

        let temperatures = sqlx::query_as::<_, Temperature>(SELECT_ALL)
            .fetch_all(&mut *conn)
            .await?;

        debug!("Fetched {} temperatures", temperatures.len());
        Ok(temperatures)
    }

    async fn fetch_one(&self, id: i32) -> Result<Temperature> {
        let mut conn = self.pool.acquire().await?;

        fetch_one_on(&mut conn, id).await
    }

    async fn insert(&self, input: &InputTemperature) -> Result<Temperature> {
        let mut conn = self.pool.acquire().await?;

        let temperature = Temperature::create(input, timestamp_now());

        sqlx::query(INSERT)
            .bind(temperature.id())
            .bind(temperature.value())
            .bind(temperature.unit())
            .bind(temperature.created_date())
            .bind(temperature.last_updated_date())
            .execute(&mut *conn)
            .await
            .map_err(|e| classify_insert_error(e, input.id))?;

        debug!("Inserted temperature {}", temperature.id());
        Ok(temperature)
    }

    async fn update(&self, input: &InputTemperature) -> Result<Temperature> {
        let mut conn = self.pool.acquire().await?;

        let mut temperature = fetch_one_on(&mut conn, input.id).await?;
        temperature.apply(input, timestamp_now());

        let result = sqlx::query(UPDATE)
            .bind(temperature.id())
            .bind(temperature.value())
            .bind(temperature.unit())
            .bind(temperature.last_updated_date())
            .execute(&mut *conn)
            .await?;

        // The row can vanish between the read and the write; that is not detected.
        if result.rows_affected() == 0 {
            warn!("Temperature {} disappeared before it could be updated", input.id);
        }

        debug!("Updated temperature {}", temperature.id());
        Ok(temperature)
    }

    async fn delete(&self, id: i32) -> Result<Temperature> {
        let mut conn = self.pool.acquire().await?;

        let temperature = fetch_one_on(&mut conn, id).await?;

        sqlx::query(DELETE).bind(id).execute(&mut *conn).await?;

        debug!("Deleted temperature {}", id);
        Ok(temperature)
    }
}

async fn fetch_one_on(conn: &mut PgConnection, id: i32) -> Result<Temperature> {
    sqlx::query_as::<_, Temperature>(SELECT_ONE)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(Error::NotFound(id))
}

fn classify_insert_error(err: sqlx::Error, id: i32) -> Error {
    if is_unique_violation(&err) {
        Error::Conflict(id)
    } else {
        Error::Database(err)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .is_some_and(|code| code == UNIQUE_VIOLATION),
        _ => false,
    }
}
