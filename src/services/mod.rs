pub mod account;
pub mod cloudinary;
