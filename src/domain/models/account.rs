use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar_url: Option<String>,
    pub purchased_avatar_urls: Vec<String>,
    pub token: Option<String>,
}

/// A registration request. Files are local paths that stay valid until the
/// request completes.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar: Option<PathBuf>,
    pub purchased_avatars: Vec<PathBuf>,
}

/// The record written by the store once every upload succeeded.
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar_url: Option<String>,
    pub purchased_avatar_urls: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub avatar: Option<PathBuf>,
}

/// Fields merged into a stored account; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    /// `Some(None)` clears the session token.
    pub token: Option<Option<String>>,
}

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}
