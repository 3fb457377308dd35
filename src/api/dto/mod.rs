//! Data Transfer Objects for REST request/response serialization.

pub mod board_dto;

pub use board_dto::*;
