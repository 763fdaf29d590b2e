// src/services/mod.rs
//
// Services Module - Use case layer

pub mod catalog_service;

pub use catalog_service::{CatalogService, UpdateRatingRequest, UpdateUserStatusesRequest};
