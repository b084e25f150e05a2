//! Shared mocks and fixtures for the integration tests

pub mod adapters;
pub mod entities;
