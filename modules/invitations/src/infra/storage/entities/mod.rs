pub mod account;
pub mod comment;
pub mod event;
pub mod invitee;
pub mod rsvp;
