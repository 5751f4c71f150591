//! Shared domain and wire types for the jobhub marketplace.
//!
//! `models` holds the entities and their closed status enums, `api` the
//! request/response bodies exchanged with clients, `validation` the form
//! checks applied to incoming requests.

pub mod api;
pub mod models;
pub mod validation;
