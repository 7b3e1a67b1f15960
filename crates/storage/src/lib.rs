#![forbid(unsafe_code)]

//! Content provider for modules and materials: repository contracts, an
//! in-memory backend and a `SQLite` backend.

pub mod repository;
pub mod sqlite;
