use std::{env, error::Error};

use async_trait::async_trait;
use model::boat::BoatId;
use parade::store::{IncidentRecord, Persistence, PositionRecord, StoreResult};

use crate::data_model::{incident::IncidentRow, position::PositionRow};

pub mod data_model;
pub mod queries;

pub struct DatabaseConnectionInfo {
    pub username: String,
    pub password: String,
    pub hostname: String,
    pub port: u16,
    pub database: String,
}

impl DatabaseConnectionInfo {
    pub fn from_env() -> Option<Self> {
        let username = env::var("DATABASE_USER").ok()?;
        let password = env::var("DATABASE_PASSWORD").ok()?;
        let hostname = env::var("DATABASE_HOST").ok()?;
        let port: u16 = env::var("DATABASE_PORT").ok()?.parse().ok()?;
        let database = env::var("DATABASE_NAME").ok()?;
        Some(Self {
            username,
            password,
            hostname,
            port,
            database,
        })
    }

    pub(self) fn postgres_url(self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.hostname, self.port, self.database
        )
    }
}

#[derive(Clone)]
pub struct PgDatabase {
    connection: sqlx::PgPool,
}

impl PgDatabase {
    pub async fn connect(
        database_connection_info: DatabaseConnectionInfo,
    ) -> Result<Self, Box<dyn Error>> {
        let url = database_connection_info.postgres_url();
        let pool = sqlx::postgres::PgPool::connect(&url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!("connected to the database, migrations are up to date");

        Ok(Self { connection: pool })
    }
}

#[async_trait]
impl Persistence for PgDatabase {
    async fn save_position(&self, boat_id: &BoatId, record: PositionRecord) -> StoreResult<i64> {
        let row = PositionRow::from_record(boat_id, record);
        queries::position::insert(&self.connection, row).await
    }

    async fn save_incident(&self, boat_id: &BoatId, record: IncidentRecord) -> StoreResult<i64> {
        let row = IncidentRow::from_record(boat_id, record);
        queries::incident::insert(&self.connection, row).await
    }
}
