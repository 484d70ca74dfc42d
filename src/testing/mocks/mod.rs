//! Mock implementations for testing

pub mod executor;

pub use executor::{MockQueryExecutor, MockQueryExecutorBuilder};
