//! REST API for the prodx service.

pub mod rest;

pub use rest::RestApi;
