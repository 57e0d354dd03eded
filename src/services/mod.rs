pub mod document_store;
mod memory_store;
mod redis_store;
mod credentials;
mod tasks;

pub use document_store::DocumentStore;
pub use memory_store::InMemoryStore;
pub use redis_store::RedisStore;
pub use credentials::CredentialStore;
pub use tasks::TaskStore;
