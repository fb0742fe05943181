// Domain layer - Measurements and connection state
pub mod connection;
pub mod measurement;
