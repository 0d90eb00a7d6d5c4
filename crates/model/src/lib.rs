pub use serde_with;

pub mod boat;
pub mod incident;
pub mod position;
pub mod route;
pub mod stats;

/// Types which can produce a representative instance, used to render JSON
/// schemas with example values.
pub trait ExampleData {
    fn example_data() -> Self;
}
