//! Vitrine - Catalogue back-office with a state-filtered public storefront feed
//!
//! This library provides the core functionality for the Vitrine catalogue service,
//! including database operations, image upload handling, the public visibility
//! rules, and API handlers.

pub mod catalogue;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod uploads;
