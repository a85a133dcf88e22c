use async_trait::async_trait;

use crate::domain::error::AppResult;
use crate::domain::models::account::{Account, AccountChanges, Credentials, Registration};

#[async_trait]
pub trait AccountService: 'static + Sync + Send {
    async fn register(&self, registration: Registration) -> AppResult<Account>;
    async fn login(&self, credentials: Credentials) -> AppResult<Account>;
    /// Resolves the account holding `token`.
    async fn authenticate(&self, token: &str) -> AppResult<Account>;
    async fn update(&self, account_id: &str, changes: AccountChanges) -> AppResult<Account>;
    async fn logout(&self, account_id: &str) -> AppResult<()>;
}
