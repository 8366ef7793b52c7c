//! Database module for PostgreSQL connectivity and the table append sink

pub mod connection;
pub mod pg_sink;

pub use connection::{init_pool, DbPool};
pub use pg_sink::PgSink;
