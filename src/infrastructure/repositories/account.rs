use std::sync::Arc;

use async_trait::async_trait;
use surrealdb::Surreal;
use surrealdb::engine::remote::ws::Client;

use crate::domain::models::account::{Account, AccountUpdate, CreateAccount};
use crate::domain::repositories::account::{AccountRepository, FindByCol};
use crate::domain::repositories::repository::{RepositoryError, RepositoryResult};
use crate::infrastructure::models::account::{
    SurrealAccount, SurrealAccountContent, SurrealAccountMerge,
};

pub struct AccountRepositoryImpl {
    db: Arc<Surreal<Client>>,
}

impl AccountRepositoryImpl {
    pub fn new(db: Arc<Surreal<Client>>) -> Self {
        Self { db }
    }
}

const ACCOUNT: &str = "account";

/// Unique indexes defined in `migration/schemas/account.surql`.
const UNIQUE_INDEXES: [(&str, &str); 2] = [
    ("account_name_unique", "name"),
    ("account_email_unique", "email"),
];

fn write_error(error: surrealdb::Error) -> RepositoryError {
    let message = error.to_string();

    if message.contains("already contains") {
        if let Some((_, field)) = UNIQUE_INDEXES
            .iter()
            .find(|(index, _)| message.contains(index))
        {
            return RepositoryError::Duplicate(field.to_string());
        }
    }

    RepositoryError::Database(error)
}

#[async_trait]
impl AccountRepository for AccountRepositoryImpl {
    async fn create(&self, new_account: CreateAccount) -> RepositoryResult<Account> {
        let account: Option<SurrealAccount> = self
            .db
            .create(ACCOUNT)
            .content(SurrealAccountContent::from(new_account))
            .await
            .map_err(write_error)?;

        account.map(Into::into).ok_or(RepositoryError::NotReturned)
    }

    async fn find_one(&self, column: FindByCol) -> RepositoryResult<Option<Account>> {
        if let FindByCol::Id(id) = column {
            let account: Option<SurrealAccount> = self.db.select((ACCOUNT, id)).await?;
            return Ok(account.map(Into::into));
        }

        let account: Option<SurrealAccount> = self
            .db
            .query(format!(
                "SELECT * FROM type::table($table) WHERE {column} = type::string($value) LIMIT 1"
            ))
            .bind(("table", ACCOUNT))
            .bind(("value", column.value()))
            .await?
            .take(0)?;

        Ok(account.map(Into::into))
    }

    async fn update(
        &self,
        account_id: &str,
        update: AccountUpdate,
    ) -> RepositoryResult<Option<Account>> {
        let updated: Option<SurrealAccount> = self
            .db
            .update((ACCOUNT, account_id.to_string()))
            .merge(SurrealAccountMerge::from(update))
            .await
            .map_err(write_error)?;

        Ok(updated.map(Into::into))
    }
}
