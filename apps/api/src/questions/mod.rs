pub mod filter;
pub mod handlers;
pub mod repository;
