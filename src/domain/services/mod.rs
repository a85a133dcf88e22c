pub mod account;
pub mod media;
