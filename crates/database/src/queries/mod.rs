use parade::store::StoreError;

pub mod incident;
pub mod position;

pub(crate) fn convert_error(why: sqlx::Error) -> StoreError {
    match why {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(why.to_string())
        }
        _ => StoreError::other(why),
    }
}
