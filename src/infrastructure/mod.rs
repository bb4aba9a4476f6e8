//! Infrastructure Layer
//!
//! Boundary implementations: the backend API client and the tab-scoped
//! storage capability.

pub mod api;
pub mod storage;
