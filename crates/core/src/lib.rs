//! Core domain types and storage contracts for the oratio project.
//!
//! This crate is backend-agnostic: it defines the prayer record shape, the
//! repository traits every storage backend must satisfy, the daily counter
//! (quota/throttle) gate, and the AI-generation boundary types. Concrete
//! adapters live in the `oratio` crate.

pub mod generation;
pub mod prayer;
pub mod quota;
pub mod storage;
