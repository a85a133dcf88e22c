use async_trait::async_trait;

use crate::domain::models::account::{Account, AccountUpdate, CreateAccount};

use super::repository::RepositoryResult;

#[derive(Debug, Clone)]
pub enum FindByCol {
    Id(String),
    Email(String),
    Token(String),
}

impl FindByCol {
    pub fn value(self) -> String {
        match self {
            Self::Id(id) => id,
            Self::Email(email) => email,
            Self::Token(token) => token,
        }
    }
}

impl std::fmt::Display for FindByCol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(_) => write!(f, "id"),
            Self::Email(_) => write!(f, "email"),
            Self::Token(_) => write!(f, "token"),
        }
    }
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Fails with `RepositoryError::Duplicate` when a unique field is taken.
    async fn create(&self, new_account: CreateAccount) -> RepositoryResult<Account>;
    async fn find_one(&self, column: FindByCol) -> RepositoryResult<Option<Account>>;
    /// Writes only the fields set in `update`; `None` when the record no
    /// longer exists.
    async fn update(
        &self,
        account_id: &str,
        update: AccountUpdate,
    ) -> RepositoryResult<Option<Account>>;
}
