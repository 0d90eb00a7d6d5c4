use parade::store::StoreResult;
use sqlx::{Executor, Postgres};

use crate::data_model::position::PositionRow;

use super::convert_error;

pub async fn insert<'c, E>(executor: E, row: PositionRow) -> StoreResult<i64>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_scalar::<_, i64>(
        "
        INSERT INTO boat_positions(
            boat_id,
            latitude,
            longitude,
            distance_along_route_meters,
            progress_percent,
            speed_kmh,
            heading_degrees,
            distance_off_route_meters,
            status,
            recorded_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id;
        ",
    )
    .bind(row.boat_id)
    .bind(row.latitude)
    .bind(row.longitude)
    .bind(row.distance_along_route_meters)
    .bind(row.progress_percent)
    .bind(row.speed_kmh)
    .bind(row.heading_degrees)
    .bind(row.distance_off_route_meters)
    .bind(row.status)
    .bind(row.recorded_at)
    .fetch_one(executor)
    .await
    .map_err(convert_error)
}
