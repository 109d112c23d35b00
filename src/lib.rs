pub mod api;
pub mod auth;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod sanitize;
pub mod services;
pub mod state;
