//! Server-rendered HTML pages and their form handlers.

pub mod components;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod views;

pub use error::PageError;
