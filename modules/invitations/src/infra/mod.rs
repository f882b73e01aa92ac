pub mod auth;
pub mod mail;
pub mod preview;
pub mod storage;
