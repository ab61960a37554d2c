pub mod connection;
pub mod job_repository;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod postgres;

pub use job_repository::{JobFilter, JobRepository, RepositoryError};
pub use memory::MemoryJobRepository;
pub use postgres::PgJobRepository;
