//! Storage layer - database entities and repositories

pub mod entity;
pub mod mapper;
pub mod migrations;
pub mod repositories;
pub mod table;

pub use repositories::{sea_orm_repositories, SeaOrmAlignmentRepository, SeaOrmRecordRepository};
