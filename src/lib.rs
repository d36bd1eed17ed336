//! ServiceAtlas: a lightweight service registry and discovery hub for
//! cooperating HTTP services — registration, health tracking, dependency
//! topology, and gateway route resolution with authentication enrichment.

pub mod bootstrap;
pub mod config;
pub mod dependency;
pub mod discovery;
pub mod errors;
pub mod health;
pub mod models;
pub mod registry;
pub mod route;
pub mod store;
pub mod web;
