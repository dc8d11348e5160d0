//! X Fun feed library.
//!
//! Turns newline-delimited lists of post and video URLs into a deduplicated,
//! progressively loaded feed of resolved content, and serves it over a small
//! JSON API.

pub mod batch;
pub mod config;
pub mod constants;
pub mod dedup;
pub mod feed;
pub mod fetcher;
pub mod handlers;
pub mod list;
pub mod lookup;
pub mod models;
pub mod web;
