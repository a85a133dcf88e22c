pub mod multipart;
pub mod seed;
