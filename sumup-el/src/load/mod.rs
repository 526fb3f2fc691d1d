//! Loading records into the SQL destination

pub mod credentials;
pub mod destination;
pub mod pipeline;
pub mod schema;

pub use pipeline::{LoadInfo, Pipeline, Resource, SQLALCHEMY_DESTINATION};
pub use schema::{ColumnHint, DataType};
