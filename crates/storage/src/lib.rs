#![forbid(unsafe_code)]

pub mod catalog_source;
pub mod repository;
pub mod sqlite;
