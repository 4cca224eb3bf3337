//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods that must run
//! inside a caller-owned transaction take `&mut PgConnection` instead.

pub mod brand_repo;
pub mod campaign_repo;
pub mod category_repo;
pub mod coupon_repo;
pub mod customer_repo;
pub mod dashboard_repo;
pub mod inventory_repo;
pub mod order_repo;
pub mod product_repo;
pub mod session_repo;
pub mod setting_repo;
pub mod user_repo;

pub use brand_repo::BrandRepo;
pub use campaign_repo::CampaignRepo;
pub use category_repo::CategoryRepo;
pub use coupon_repo::CouponRepo;
pub use customer_repo::CustomerRepo;
pub use dashboard_repo::DashboardRepo;
pub use inventory_repo::InventoryRepo;
pub use order_repo::OrderRepo;
pub use product_repo::ProductRepo;
pub use session_repo::SessionRepo;
pub use setting_repo::SettingRepo;
pub use user_repo::UserRepo;
