pub mod app;
pub mod auth;
pub mod classifications;
pub mod config;
pub mod customers;
pub mod error;
pub mod ingredients;
pub mod recipes;
pub mod resource;
pub mod reviews;
pub mod state;
pub mod weekly_menus;
