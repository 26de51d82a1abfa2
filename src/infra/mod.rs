//! Infrastructure adapters and runtime bootstrap.

pub mod catalog;
pub mod error;
pub mod flush;
pub mod repository;
pub mod spool;
pub mod telemetry;

pub use catalog::HttpCatalogClient;
pub use error::InfraError;
pub use flush::DispatcherFlushClient;
pub use repository::HttpRepositoryClient;
pub use spool::SpoolWatcher;
