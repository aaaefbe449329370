pub mod error;
pub mod event;
pub mod filter;
pub mod postgres;

pub use error::Error;
pub use event::Event;
pub use filter::Filter;
pub use postgres::{PostgresBackend, QueryLimits};
