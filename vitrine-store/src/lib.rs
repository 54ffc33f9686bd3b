pub mod app_config;
pub mod database;
pub mod flash_sale_repo;
pub mod product_repo;
pub mod redis_repo;

pub use database::DbClient;
pub use flash_sale_repo::PgFlashSaleRepository;
pub use product_repo::PgProductRepository;
pub use redis_repo::RedisClient;
