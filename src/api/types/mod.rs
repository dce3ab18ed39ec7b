//! API request/response types

pub mod error;

pub use error::{ApiError, DetailBody, HttpErrorBody, UnexpectedErrorBody};
