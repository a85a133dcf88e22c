use thiserror::Error;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Error, Debug)]
pub enum RepositoryError {
    /// A unique index rejected the write; holds the offending field.
    #[error("{0} already exists")]
    Duplicate(String),
    #[error("the store did not return the written record")]
    NotReturned,
    #[error(transparent)]
    Database(#[from] surrealdb::Error),
}
