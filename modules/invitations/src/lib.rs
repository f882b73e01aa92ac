//! Event invitations: invite pages, RSVPs with email confirmations, an admin
//! panel and social preview images.

pub mod contract;
pub use contract::model;

pub mod module;
pub use module::Invitations;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
