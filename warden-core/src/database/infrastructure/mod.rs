//! Storage adapters.

pub mod postgres;
