pub mod auth;
pub mod brands;
pub mod campaigns;
pub mod categories;
pub mod coupons;
pub mod customers;
pub mod dashboard;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod roles;
pub mod settings;
pub mod users;
