//! Larkspur Core - Shared domain types.
//!
//! Types shared by the storefront and its tests: carts, line items,
//! variants, taxed money, checkout and customer identity.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Everything
//! here is owned by the commerce backend; the storefront reads these values
//! and never mutates them locally.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, cart and checkout types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
