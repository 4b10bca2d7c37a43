//! Orders

mod models;
mod repository;

pub(crate) use models::*;
pub(crate) use repository::*;
