//! # Board Shared
//!
//! Wire types shared by the board server and its clients.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
