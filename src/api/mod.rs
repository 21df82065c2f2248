//! Web surface: login gate, search form, run trigger and archive download

pub mod auth;
mod error;
pub mod models;
mod pages;
mod server;
pub mod services;
pub mod state;
pub(crate) mod utils;
mod validation;

pub use error::ApiError;
pub use server::{router, run};
pub use validation::{FormError, criteria_from_form};
