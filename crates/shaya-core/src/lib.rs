//! Core types and trait definitions for the Shaya administrative backend.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the domain model (persons and the three role entities that own them), the
//! validation and normalisation rules, the uniqueness guard, and the generic
//! entity service that every storage backend is driven through.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod customer;
pub mod entity;
pub mod error;
pub mod farmer;
pub mod guard;
pub mod normalize;
pub mod password;
pub mod person;
pub mod service;
pub mod store;
pub mod user;
pub mod validate;

pub use error::{Error, Result};
