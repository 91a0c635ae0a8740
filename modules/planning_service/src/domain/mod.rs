//! Domain layer - business logic and services

pub mod alignment;
pub mod events;
pub mod object_store;
pub mod record;
pub mod records;
pub mod repository;
pub mod service;
pub mod validation;

pub use events::{EventPublisher, NoOpEventPublisher, PlanningEvent};
pub use object_store::ObjectStore;
pub use record::{Record, RecordOps};
pub use repository::{AlignmentRepository, RecordRepository, Repositories};
pub use service::Service;
