use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::domain::models::account::{Account, AccountUpdate, CreateAccount};

#[derive(Debug, Deserialize)]
pub struct SurrealAccount {
    id: Thing,
    name: String,
    email: String,
    password: String,
    avatar_url: Option<String>,
    #[serde(default)]
    purchased_avatar_urls: Vec<String>,
    token: Option<String>,
}

#[derive(Serialize)]
pub struct SurrealAccountContent {
    name: String,
    email: String,
    password: String,
    avatar_url: Option<String>,
    purchased_avatar_urls: Vec<String>,
    token: Option<String>,
}

impl From<CreateAccount> for SurrealAccountContent {
    fn from(acc: CreateAccount) -> Self {
        SurrealAccountContent {
            name: acc.name,
            email: acc.email,
            password: acc.password,
            avatar_url: acc.avatar_url,
            purchased_avatar_urls: acc.purchased_avatar_urls,
            token: None,
        }
    }
}

/// `MERGE` payload. Unset fields are omitted; a cleared token is sent as
/// `NONE`, which removes the field.
#[derive(Serialize)]
pub struct SurrealAccountMerge {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<Option<String>>,
}

impl From<AccountUpdate> for SurrealAccountMerge {
    fn from(update: AccountUpdate) -> Self {
        SurrealAccountMerge {
            name: update.name,
            avatar_url: update.avatar_url,
            token: update.token,
        }
    }
}

impl From<SurrealAccount> for Account {
    fn from(acc: SurrealAccount) -> Self {
        Account {
            id: acc.id.id.to_string(),
            name: acc.name,
            email: acc.email,
            password: acc.password,
            avatar_url: acc.avatar_url,
            purchased_avatar_urls: acc.purchased_avatar_urls,
            token: acc.token,
        }
    }
}
