// Service exports
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod roommates;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use memory::InMemoryRepository;
pub use postgres::{PostgresClient, PostgresError};
pub use repository::{RepositoryError, RoommateRepository};
pub use roommates::{RankingLimits, RoommateService, ServiceError};
