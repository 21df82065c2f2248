pub mod api;
pub mod archive;
pub mod config;
pub mod fetch;
pub mod humanize;
pub mod observability;
pub mod pipeline;
pub mod progress;
pub mod search;
