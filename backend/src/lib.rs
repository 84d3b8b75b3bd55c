//! Course Manager Backend Library
//!
//! This library exports the core modules for the course manager backend server.

pub mod app_state;
pub mod auth;
pub mod config;
pub mod course;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod store;
pub mod user;
