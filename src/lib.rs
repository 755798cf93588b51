//! Postgate: a caching facade in front of an upstream blog REST API.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
