pub mod incident;
pub mod position;
