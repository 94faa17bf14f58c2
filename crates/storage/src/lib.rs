pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryStore, LocalStore, Storage, StorageError, StoreScope};
