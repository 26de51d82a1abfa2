//! Domain layer types and invariants.

pub mod catalog;
pub mod error;
pub mod notification;
pub mod paths;
pub mod store;

pub use error::{CatalogError, FlushError, RepositoryError};
pub use notification::{ChangeNotification, PropertyValue};
pub use store::{StoreContext, StoreRegistry};
