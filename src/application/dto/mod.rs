//! Data Transfer Objects
//!
//! Request and response payloads for the backend API.

mod request;
mod response;

pub use request::*;
pub use response::*;
