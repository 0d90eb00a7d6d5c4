use parade::store::StoreResult;
use sqlx::{Executor, Postgres};

use crate::data_model::incident::IncidentRow;

use super::convert_error;

pub async fn insert<'c, E>(executor: E, row: IncidentRow) -> StoreResult<i64>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_scalar::<_, i64>(
        "
        INSERT INTO boat_incidents(
            boat_id,
            incident_type,
            severity,
            message,
            status,
            occurred_at
        )
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id;
        ",
    )
    .bind(row.boat_id)
    .bind(row.incident_type)
    .bind(row.severity)
    .bind(row.message)
    .bind(row.status)
    .bind(row.occurred_at)
    .fetch_one(executor)
    .await
    .map_err(convert_error)
}
