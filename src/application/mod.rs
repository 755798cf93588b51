//! Application services: cache-aside orchestration over the upstream API.

pub mod cache_aside;
pub mod error;
pub mod posts;
pub mod repos;
pub mod users;

#[cfg(test)]
mod test_support;
