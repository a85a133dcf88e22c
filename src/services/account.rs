use std::path::Path;
use std::sync::Arc;

use crate::domain::{
    error::{AppError, AppResult, message},
    models::account::{
        Account, AccountChanges, AccountUpdate, CreateAccount, Credentials, Registration,
    },
    models::media::{UploadOptions, UploadedMedia},
    repositories::account::{AccountRepository, FindByCol},
    repositories::repository::{RepositoryError, RepositoryResult},
    services::account::AccountService,
    services::media::MediaUploader,
};

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, Result, SaltString, rand_core::OsRng,
    },
};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

pub struct AccountServiceImpl {
    repository: Arc<dyn AccountRepository>,
    uploader: Arc<dyn MediaUploader>,
    folder: String,
}

impl AccountServiceImpl {
    pub fn new(
        repository: Arc<dyn AccountRepository>,
        uploader: Arc<dyn MediaUploader>,
        folder: String,
    ) -> Self {
        Self {
            repository,
            uploader,
            folder,
        }
    }

    async fn find(&self, column: FindByCol) -> AppResult<Option<Account>> {
        Ok(self.repository.find_one(column).await?)
    }

    async fn find_by_id(&self, account_id: &str) -> AppResult<Account> {
        self.find(FindByCol::Id(account_id.to_string()))
            .await?
            .ok_or_else(|| AppError::NotFound(message::NOT_FOUND))
    }

    /// Uploads `file`, recording the result in `uploaded` so it can be
    /// discarded if the operation aborts later. A failure is reported as
    /// `failed()`.
    async fn upload(
        &self,
        file: &Path,
        failed: fn() -> AppError,
        uploaded: &mut Vec<UploadedMedia>,
    ) -> AppResult<String> {
        let options = UploadOptions {
            folder: self.folder.clone(),
            public_id: public_id(),
            overwrite: true,
        };

        match self.uploader.upload(file, options).await {
            Ok(media) => {
                let url = media.secure_url.clone();
                uploaded.push(media);
                Ok(url)
            }
            Err(error) => {
                tracing::error!(error = %error, file = %file.display(), "media upload failed");
                Err(failed().trace(&error.to_string()))
            }
        }
    }

    async fn discard(&self, uploaded: &[UploadedMedia]) {
        for media in uploaded {
            if let Err(error) = self.uploader.destroy(&media.public_id).await {
                tracing::warn!(
                    error = %error,
                    public_id = %media.public_id,
                    "failed to discard orphaned media"
                );
            }
        }
    }

    async fn save(&self, account_id: &str, update: AccountUpdate) -> AppResult<Account> {
        saved(self.repository.update(account_id, update).await)?
            .ok_or_else(|| AppError::NotFound(message::NOT_FOUND))
    }

    async fn create(
        &self,
        registration: Registration,
        uploaded: &mut Vec<UploadedMedia>,
    ) -> AppResult<Account> {
        let password = encrypt_password(&registration.password)?;

        let avatar_url = match &registration.avatar {
            Some(avatar) => Some(self.upload(avatar, AppError::UploadFailed, uploaded).await?),
            None => None,
        };

        let mut purchased_avatar_urls = Vec::with_capacity(registration.purchased_avatars.len());
        for file in &registration.purchased_avatars {
            purchased_avatar_urls.push(self.upload(file, AppError::UploadFailed, uploaded).await?);
        }

        saved(
            self.repository
                .create(CreateAccount {
                    name: registration.name,
                    email: registration.email,
                    password,
                    avatar_url,
                    purchased_avatar_urls,
                })
                .await,
        )
    }

    async fn apply(
        &self,
        account_id: &str,
        changes: AccountChanges,
        uploaded: &mut Vec<UploadedMedia>,
    ) -> AppResult<Account> {
        let account = self.find_by_id(account_id).await?;

        let avatar_url = match &changes.avatar {
            Some(avatar) => {
                Some(
                    self.upload(avatar, AppError::AvatarUploadFailed, uploaded)
                        .await?,
                )
            }
            None => None,
        };

        let update = AccountUpdate {
            name: changes.name,
            avatar_url,
            token: None,
        };

        self.save(&account.id, update).await
    }
}

#[async_trait]
impl AccountService for AccountServiceImpl {
    async fn register(&self, registration: Registration) -> AppResult<Account> {
        let mut uploaded = Vec::new();

        let result = self.create(registration, &mut uploaded).await;

        match &result {
            Ok(account) => tracing::info!(account_id = %account.id, "account registered"),
            Err(_) => self.discard(&uploaded).await,
        }

        result
    }

    async fn login(&self, credentials: Credentials) -> AppResult<Account> {
        let account = match self.find(FindByCol::Email(credentials.email)).await? {
            Some(account) => account,
            None => return Err(AppError::InvalidCredentials(message::EMAIL_NOT_FOUND)),
        };

        verify_password(&credentials.password, &account.password)?;

        let update = AccountUpdate {
            token: Some(Some(Uuid::new_v4().to_string())),
            ..Default::default()
        };

        self.save(&account.id, update).await
    }

    async fn authenticate(&self, token: &str) -> AppResult<Account> {
        if token.is_empty() {
            return Err(AppError::Unauthorized());
        }

        self.find(FindByCol::Token(token.to_string()))
            .await?
            .ok_or_else(AppError::Unauthorized)
    }

    async fn update(&self, account_id: &str, changes: AccountChanges) -> AppResult<Account> {
        let mut uploaded = Vec::new();

        let result = self.apply(account_id, changes, &mut uploaded).await;

        if result.is_err() {
            self.discard(&uploaded).await;
        }

        result
    }

    async fn logout(&self, account_id: &str) -> AppResult<()> {
        let account = self.find_by_id(account_id).await?;

        let update = AccountUpdate {
            token: Some(None),
            ..Default::default()
        };

        self.save(&account.id, update).await.map(|_| ())
    }
}

/// Translates a store write result, reporting failures that are not the
/// caller's fault.
fn saved<T>(result: RepositoryResult<T>) -> AppResult<T> {
    result.map_err(|error| match error {
        RepositoryError::Duplicate(field) => AppError::taken(&field),
        error => {
            tracing::error!(error = %error, "failed to save account");
            AppError::SaveFailed().trace(&error.to_string())
        }
    })
}

fn public_id() -> String {
    format!("image_{}_{}", Utc::now().timestamp(), Uuid::new_v4().simple())
}

pub fn encrypt_password(password: &str) -> Result<String> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<()> {
    let argon2 = Argon2::default();
    let hash = PasswordHash::new(hash);

    argon2.verify_password(password.as_bytes(), &hash?)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::infrastructure::repositories::account::mock::AccountRepositoryImpl;
    use crate::domain::models::media::MediaError;
    use crate::services::cloudinary::mock::MediaUploaderImpl;
    use rstest::*;

    /// Clears the session of the first stored account while an upload is in
    /// flight, as a concurrent logout would.
    struct LogoutDuringUpload(Arc<AccountRepositoryImpl>);

    #[async_trait]
    impl MediaUploader for LogoutDuringUpload {
        async fn upload(
            &self,
            file: &Path,
            options: UploadOptions,
        ) -> std::result::Result<UploadedMedia, MediaError> {
            self.0.accounts.lock().await[0].token = None;

            Ok(UploadedMedia {
                secure_url: format!("https://media.test/{}/{}", options.folder, file.display()),
                public_id: options.public_id,
            })
        }

        async fn destroy(&self, _public_id: &str) -> std::result::Result<(), MediaError> {
            Ok(())
        }
    }

    fn other() -> Account {
        Account {
            id: "2".to_string(),
            name: "Other".to_string(),
            email: "other@teka.app".to_string(),
            token: None,
            avatar_url: None,
            purchased_avatar_urls: vec![],
            ..seeded()
        }
    }

    struct Harness {
        service: AccountServiceImpl,
        repository: Arc<AccountRepositoryImpl>,
        uploader: Arc<MediaUploaderImpl>,
    }

    fn seeded() -> Account {
        Account {
            id: "1".to_string(),
            name: "Test".to_string(),
            email: "test_account@teka.app".to_string(),
            password: encrypt_password("p4ssw0rd").unwrap(),
            avatar_url: Some("https://media.test/teka_apps/old.png".to_string()),
            purchased_avatar_urls: vec!["https://media.test/teka_apps/p0.png".to_string()],
            token: None,
        }
    }

    fn harness(uploader: MediaUploaderImpl) -> Harness {
        let repository = Arc::new(AccountRepositoryImpl::with_accounts(vec![seeded()]));
        let uploader = Arc::new(uploader);

        Harness {
            service: AccountServiceImpl::new(
                repository.clone(),
                uploader.clone(),
                "teka_apps".to_string(),
            ),
            repository,
            uploader,
        }
    }

    #[fixture]
    fn ctx() -> Harness {
        harness(MediaUploaderImpl::default())
    }

    fn registration(name: &str) -> Registration {
        Registration {
            name: name.to_string(),
            email: format!("{name}@teka.app"),
            password: "p4ssw0rd".to_string(),
            avatar: None,
            purchased_avatars: vec![],
        }
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_with_avatar(ctx: Harness) {
        let account = ctx
            .service
            .register(Registration {
                avatar: Some(PathBuf::from("/tmp/alice.png")),
                ..registration("alice")
            })
            .await
            .unwrap();

        assert_eq!(account.name, "alice");
        assert_eq!(
            account.avatar_url.as_deref(),
            Some("https://media.test/teka_apps/alice.png")
        );
        assert!(account.purchased_avatar_urls.is_empty());
        assert!(verify_password("p4ssw0rd", &account.password).is_ok());

        let calls = ctx.uploader.uploads().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.folder, "teka_apps");
        assert!(calls[0].1.overwrite);
        assert!(calls[0].1.public_id.starts_with("image_"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_without_files_skips_uploads(ctx: Harness) {
        let account = ctx.service.register(registration("alice")).await.unwrap();

        assert_eq!(account.avatar_url, None);
        assert!(ctx.uploader.uploads().await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_keeps_purchased_avatar_order(ctx: Harness) {
        let account = ctx
            .service
            .register(Registration {
                purchased_avatars: vec![
                    PathBuf::from("/tmp/first.png"),
                    PathBuf::from("/tmp/second.png"),
                    PathBuf::from("/tmp/third.png"),
                ],
                ..registration("alice")
            })
            .await
            .unwrap();

        assert_eq!(account.avatar_url, None);
        assert_eq!(
            account.purchased_avatar_urls,
            vec![
                "https://media.test/teka_apps/first.png",
                "https://media.test/teka_apps/second.png",
                "https://media.test/teka_apps/third.png",
            ]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_uploads_get_distinct_public_ids(ctx: Harness) {
        ctx.service
            .register(Registration {
                avatar: Some(PathBuf::from("/tmp/a.png")),
                purchased_avatars: vec![PathBuf::from("/tmp/b.png"), PathBuf::from("/tmp/c.png")],
                ..registration("alice")
            })
            .await
            .unwrap();

        let mut ids: Vec<String> = ctx
            .uploader
            .uploads()
            .await
            .into_iter()
            .map(|(_, options)| options.public_id)
            .collect();
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_name_taken(ctx: Harness) {
        let result = ctx
            .service
            .register(Registration {
                email: "other@teka.app".to_string(),
                ..registration("Test")
            })
            .await;

        assert_eq!(result.unwrap_err(), AppError::taken("name"));
        assert_eq!(ctx.repository.accounts.lock().await.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_email_taken(ctx: Harness) {
        let result = ctx
            .service
            .register(Registration {
                email: "test_account@teka.app".to_string(),
                avatar: Some(PathBuf::from("/tmp/avatar.png")),
                ..registration("alice")
            })
            .await;

        assert_eq!(result.unwrap_err(), AppError::taken("email"));
        assert_eq!(ctx.repository.accounts.lock().await.len(), 1);
        assert_eq!(ctx.uploader.destroyed().await.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_twice(ctx: Harness) {
        ctx.service.register(registration("alice")).await.unwrap();

        let second = ctx.service.register(registration("alice")).await;

        assert_eq!(second.unwrap_err().code, 400);

        let accounts = ctx.repository.accounts.lock().await;
        assert_eq!(accounts.iter().filter(|a| a.name == "alice").count(), 1);
    }

    #[rstest]
    #[case::avatar(1)]
    #[case::first_purchased(2)]
    #[case::last_purchased(4)]
    #[tokio::test]
    async fn test_register_upload_failure_aborts(#[case] failing: usize) {
        let ctx = harness(MediaUploaderImpl::failing_at(failing));

        let result = ctx
            .service
            .register(Registration {
                avatar: Some(PathBuf::from("/tmp/avatar.png")),
                purchased_avatars: vec![
                    PathBuf::from("/tmp/p1.png"),
                    PathBuf::from("/tmp/p2.png"),
                    PathBuf::from("/tmp/p3.png"),
                ],
                ..registration("alice")
            })
            .await;

        let error = result.unwrap_err();
        assert_eq!(error.code, 500);
        assert_eq!(error.message, message::UPLOAD_FAILED);

        // Uploads stop at the failing file.
        assert_eq!(ctx.uploader.uploads().await.len(), failing);
        assert_eq!(ctx.repository.accounts.lock().await.len(), 1);

        // Everything uploaded before the failure is cleaned up.
        assert_eq!(ctx.uploader.destroyed().await.len(), failing - 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_name_taken_discards_uploads(ctx: Harness) {
        let result = ctx
            .service
            .register(Registration {
                email: "other@teka.app".to_string(),
                avatar: Some(PathBuf::from("/tmp/avatar.png")),
                ..registration("Test")
            })
            .await;

        assert_eq!(result.unwrap_err().code, 400);
        assert_eq!(ctx.uploader.destroyed().await.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_register_save_failure(ctx: Harness) {
        ctx.repository.fail_writes.store(true, Ordering::SeqCst);

        let result = ctx.service.register(registration("alice")).await;

        let error = result.unwrap_err();
        assert_eq!(error.code, 500);
        assert_eq!(error.message, message::SAVE_FAILED);
        assert!(error.trace.is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn test_login_success(ctx: Harness) {
        let account = ctx
            .service
            .login(credentials("test_account@teka.app", "p4ssw0rd"))
            .await
            .unwrap();

        let token = account.token.unwrap();
        assert!(Uuid::parse_str(&token).is_ok());

        let stored = ctx.repository.accounts.lock().await[0].clone();
        assert_eq!(stored.token, Some(token));
    }

    #[rstest]
    #[tokio::test]
    async fn test_login_rotates_token(ctx: Harness) {
        let first = ctx
            .service
            .login(credentials("test_account@teka.app", "p4ssw0rd"))
            .await
            .unwrap()
            .token
            .unwrap();

        let second = ctx
            .service
            .login(credentials("test_account@teka.app", "p4ssw0rd"))
            .await
            .unwrap()
            .token
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(
            ctx.service.authenticate(&first).await.unwrap_err(),
            AppError::Unauthorized()
        );
        assert_eq!(ctx.service.authenticate(&second).await.unwrap().id, "1");
    }

    #[rstest]
    #[tokio::test]
    async fn test_login_unknown_email(ctx: Harness) {
        let before = ctx.repository.accounts.lock().await.clone();

        let result = ctx
            .service
            .login(credentials("missing@x.com", "p4ssw0rd"))
            .await;

        assert_eq!(
            result.unwrap_err(),
            AppError::InvalidCredentials("email not found")
        );
        assert_eq!(*ctx.repository.accounts.lock().await, before);
    }

    #[rstest]
    #[tokio::test]
    async fn test_login_wrong_password(ctx: Harness) {
        let result = ctx
            .service
            .login(credentials("test_account@teka.app", "wrongpassword"))
            .await;

        assert_eq!(result.unwrap_err(), AppError::Unauthorized());
        assert_eq!(ctx.repository.accounts.lock().await[0].token, None);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_name_only(ctx: Harness) {
        let account = ctx
            .service
            .update(
                "1",
                AccountChanges {
                    name: Some("Renamed".to_string()),
                    avatar: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(account.name, "Renamed");
        assert_eq!(account.avatar_url, seeded().avatar_url);
        assert_eq!(account.purchased_avatar_urls, seeded().purchased_avatar_urls);
        assert!(ctx.uploader.uploads().await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_avatar(ctx: Harness) {
        let account = ctx
            .service
            .update(
                "1",
                AccountChanges {
                    name: None,
                    avatar: Some(PathBuf::from("/tmp/new.png")),
                },
            )
            .await
            .unwrap();

        assert_eq!(account.name, "Test");
        assert_eq!(
            account.avatar_url.as_deref(),
            Some("https://media.test/teka_apps/new.png")
        );
        assert_eq!(account.purchased_avatar_urls, seeded().purchased_avatar_urls);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_upload_failure_keeps_account() {
        let ctx = harness(MediaUploaderImpl::failing_at(1));
        let before = ctx.repository.accounts.lock().await.clone();

        let result = ctx
            .service
            .update(
                "1",
                AccountChanges {
                    name: Some("Renamed".to_string()),
                    avatar: Some(PathBuf::from("/tmp/new.png")),
                },
            )
            .await;

        let error = result.unwrap_err();
        assert_eq!(error.code, 500);
        assert_eq!(error.message, message::AVATAR_UPLOAD_FAILED);
        assert_eq!(*ctx.repository.accounts.lock().await, before);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_save_failure_discards_avatar(ctx: Harness) {
        ctx.repository.fail_writes.store(true, Ordering::SeqCst);

        let result = ctx
            .service
            .update(
                "1",
                AccountChanges {
                    name: None,
                    avatar: Some(PathBuf::from("/tmp/new.png")),
                },
            )
            .await;

        assert_eq!(result.unwrap_err().code, 500);
        assert_eq!(ctx.uploader.destroyed().await.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_name_taken(ctx: Harness) {
        ctx.repository.accounts.lock().await.push(other());
        let before = ctx.repository.accounts.lock().await.clone();

        let result = ctx
            .service
            .update(
                "1",
                AccountChanges {
                    name: Some("Other".to_string()),
                    avatar: Some(PathBuf::from("/tmp/new.png")),
                },
            )
            .await;

        assert_eq!(result.unwrap_err(), AppError::taken("name"));
        assert_eq!(*ctx.repository.accounts.lock().await, before);
        assert_eq!(ctx.uploader.destroyed().await.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_keeps_token_cleared_during_upload() {
        let repository = Arc::new(AccountRepositoryImpl::with_accounts(vec![Account {
            token: Some("session".to_string()),
            ..seeded()
        }]));
        let service = AccountServiceImpl::new(
            repository.clone(),
            Arc::new(LogoutDuringUpload(repository.clone())),
            "teka_apps".to_string(),
        );

        let account = service
            .update(
                "1",
                AccountChanges {
                    name: Some("Renamed".to_string()),
                    avatar: Some(PathBuf::from("new.png")),
                },
            )
            .await
            .unwrap();

        assert_eq!(account.name, "Renamed");
        assert_eq!(account.token, None);
        assert_eq!(repository.accounts.lock().await[0].token, None);
        assert_eq!(
            service.authenticate("session").await.unwrap_err(),
            AppError::Unauthorized()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_missing_account(ctx: Harness) {
        let result = ctx.service.update("404", AccountChanges::default()).await;

        assert_eq!(
            result.unwrap_err(),
            AppError::NotFound("Account not found")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_logout_clears_token(ctx: Harness) {
        let token = ctx
            .service
            .login(credentials("test_account@teka.app", "p4ssw0rd"))
            .await
            .unwrap()
            .token
            .unwrap();

        ctx.service.logout("1").await.unwrap();

        assert_eq!(ctx.repository.accounts.lock().await[0].token, None);
        assert_eq!(
            ctx.service.authenticate(&token).await.unwrap_err(),
            AppError::Unauthorized()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_logout_missing_account(ctx: Harness) {
        assert_eq!(
            ctx.service.logout("404").await.unwrap_err(),
            AppError::NotFound("Account not found")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_logout_save_failure(ctx: Harness) {
        ctx.repository.fail_writes.store(true, Ordering::SeqCst);

        let error = ctx.service.logout("1").await.unwrap_err();

        assert_eq!(error.code, 500);
        assert_eq!(error.message, message::SAVE_FAILED);
    }

    #[rstest]
    #[tokio::test]
    async fn test_authenticate_empty_token(ctx: Harness) {
        assert_eq!(
            ctx.service.authenticate("").await.unwrap_err(),
            AppError::Unauthorized()
        );
    }
}
