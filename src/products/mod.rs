//! Products

pub(crate) mod errors;
pub(crate) mod handlers;
mod models;
mod repository;

pub(crate) use models::*;
pub(crate) use repository::*;
