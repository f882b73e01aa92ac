pub mod layers;
pub mod request_id;
