//! Application Layer
//!
//! Contains the page-flow services and data transfer objects (DTOs).
//! This layer orchestrates session state, cooldowns, and chat between
//! the page surface and the backend client.

pub mod services;
pub mod dto;
