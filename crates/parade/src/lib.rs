use actors::actor::ActorError;
use model::boat::{BoatId, IllegalTransition};

mod boat;
pub mod devices;
pub mod mapper;
pub mod route;
pub mod settings;
pub mod store;
pub mod tracker;

pub use mapper::{MappingError, MappingResult, RouteMapper};
pub use route::{Route, RouteError};
pub use settings::{ParadeConfig, TrackerSettings};
pub use tracker::{BoatTracker, IngestedPosition};

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("boat {0} is not known")]
    NotFound(BoatId),
    #[error(transparent)]
    IllegalTransition(#[from] IllegalTransition),
    #[error("boat {0} is not reachable: {1}")]
    Unavailable(BoatId, ActorError),
}

pub type TrackerResult<O> = Result<O, TrackerError>;

pub fn not_found_to_none<O>(result: TrackerResult<O>) -> TrackerResult<Option<O>> {
    match result {
        Err(TrackerError::NotFound(_)) => Ok(None),
        result => result.map(Some),
    }
}
