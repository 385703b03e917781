pub mod config;
pub mod dtos;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod services;
pub mod startup;
