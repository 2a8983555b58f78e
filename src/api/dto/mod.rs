//! Data Transfer Objects for REST response serialization.

pub mod raffle_dto;

pub use raffle_dto::*;
