pub mod analyzers;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod utils;
pub mod writers;

pub use analyzers::{QueryEngine, QueryOptions, QueryRequest, QueryResult};
pub use error::{DashboardError, Result};
pub use models::Dataset;
