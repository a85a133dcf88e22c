use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub folder: String,
    pub public_id: String,
    pub overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub secure_url: String,
    pub public_id: String,
}

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("media host rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}
