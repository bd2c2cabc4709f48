//! Trellis Core Library
//!
//! Core functionality for Trellis - a privacy-scoped social feed.
//! This crate owns the friend graph, the post visibility rule, and
//! per-post engagement (likes and comments). Transport, authentication,
//! and rendering live in the surrounding service.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![deny(unsafe_code)]

mod api;
pub mod directory;
pub mod feed;
pub mod graph;

pub use api::{CoreError, SocialCore};
