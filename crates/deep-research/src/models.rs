pub mod interaction;
pub mod request;
