//! Infrastructure layer - database storage, object storage and event sinks

pub mod events;
pub mod object_store;
pub mod storage;

pub use events::LoggingEventPublisher;
pub use object_store::{FsObjectStore, MemoryObjectStore};
