pub mod calendar;
pub mod display;
pub mod error;
pub mod ports;
pub mod repo;
pub mod service;
