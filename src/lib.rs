pub mod client;
pub mod config;
pub mod context;
pub mod db;
pub mod errors;
pub mod flows;
pub mod models;
pub mod responses;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
pub mod views;

pub use client::AppCore;
pub use state::AppState;
