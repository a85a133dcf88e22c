use std::path::PathBuf;

use crate::api::dto::validation::{
    is_email, is_email_field, is_name_field, is_password_field,
};
use crate::domain::models::account::{Account, AccountChanges, Credentials, Registration};
use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use serde::Deserialize;
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountDTO {
    id: String,
    name: String,
    email: String,
    avatar_url: Option<String>,
    purchased_avatar_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(examples("5f1c9e5e-7a6b-4c1e-9a39-2b8f0f4b1c2d"))]
    token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponseDTO {
    pub data: AccountDTO,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutResponseDTO {
    #[schema(examples(true))]
    pub data: bool,
}

#[derive(Debug, MultipartForm, Validate)]
pub struct RegisterForm {
    #[validate(custom(function = "is_name_field"))]
    pub name: Text<String>,

    #[validate(custom(function = "is_email_field"))]
    pub email: Text<String>,

    #[validate(custom(function = "is_password_field"))]
    pub password: Text<String>,

    #[multipart(limit = "10MB")]
    pub avatar: Option<TempFile>,

    #[multipart(limit = "10MB")]
    pub purchased_avatars: Vec<TempFile>,
}

#[derive(Debug, MultipartForm, Validate)]
pub struct UpdateForm {
    #[validate(custom(function = "is_name_field"))]
    pub name: Option<Text<String>>,

    #[multipart(limit = "10MB")]
    pub avatar: Option<TempFile>,
}

/// OpenAPI shape of [`RegisterForm`].
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct RegisterFormSchema {
    #[schema(examples("your_name"))]
    name: String,
    #[schema(examples("your@email.com"))]
    email: String,
    #[schema(examples("stR0ngP4ssw0rd!"))]
    password: String,
    #[schema(value_type = Option<String>, format = Binary)]
    avatar: Option<Vec<u8>>,
    #[schema(value_type = Vec<String>)]
    purchased_avatars: Vec<Vec<u8>>,
}

/// OpenAPI shape of [`UpdateForm`].
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UpdateFormSchema {
    #[schema(examples("new_name"))]
    name: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    avatar: Option<Vec<u8>>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CredentialsDTO {
    #[validate(custom(function = "is_email"))]
    #[schema(examples("your@email.com"))]
    pub email: String,

    #[schema(examples("stR0ngP4ssw0rd!"))]
    pub password: String,
}

/// Browsers send an empty part when no file was picked.
fn path(file: &TempFile) -> Option<PathBuf> {
    (file.size > 0).then(|| file.file.path().to_path_buf())
}

impl From<Account> for AccountResponseDTO {
    fn from(val: Account) -> Self {
        AccountResponseDTO { data: val.into() }
    }
}

impl From<Account> for AccountDTO {
    fn from(val: Account) -> Self {
        AccountDTO {
            id: val.id,
            name: val.name,
            email: val.email,
            avatar_url: val.avatar_url,
            purchased_avatar_urls: val.purchased_avatar_urls,
            token: val.token,
        }
    }
}

/// The temporary files stay owned by the form; keep it alive until the
/// service call completes.
impl From<&RegisterForm> for Registration {
    fn from(form: &RegisterForm) -> Self {
        Registration {
            name: form.name.trim().to_string(),
            email: form.email.0.clone(),
            password: form.password.0.clone(),
            avatar: form.avatar.as_ref().and_then(path),
            purchased_avatars: form.purchased_avatars.iter().filter_map(path).collect(),
        }
    }
}

impl From<&UpdateForm> for AccountChanges {
    fn from(form: &UpdateForm) -> Self {
        AccountChanges {
            name: form.name.as_ref().map(|name| name.trim().to_string()),
            avatar: form.avatar.as_ref().and_then(path),
        }
    }
}

impl From<CredentialsDTO> for Credentials {
    fn from(credentials: CredentialsDTO) -> Self {
        Credentials {
            email: credentials.email,
            password: credentials.password,
        }
    }
}
