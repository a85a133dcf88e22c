use crate::domain::error::AppError;
use crate::domain::models::account::Account;
use crate::domain::services::account::AccountService;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use futures::future::{FutureExt, LocalBoxFuture};
use std::sync::Arc;

pub const TOKEN_COOKIE: &str = "Authorization";

/// The account owning the request's token.
#[derive(Debug)]
pub struct CurrentAccount(pub Account);

impl CurrentAccount {
    pub fn into_inner(self) -> Account {
        self.0
    }
}

fn get_token(req: &HttpRequest) -> Result<String, AppError> {
    if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
        return Ok(cookie.value().to_string());
    }

    if let Some(header) = req.headers().get("Authorization") {
        return Ok(header
            .to_str()
            .map_err(|_| AppError::Unauthorized())?
            .trim_start_matches("Bearer")
            .trim()
            .to_string());
    }

    Err(AppError::Unauthorized())
}

impl FromRequest for CurrentAccount {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<CurrentAccount, AppError>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let Some(account_service) = req
            .app_data::<web::Data<Arc<dyn AccountService>>>()
            .map(|service| Arc::clone(service.get_ref()))
        else {
            return futures::future::err::<CurrentAccount, AppError>(
                AppError::InternalError().trace("AccountService is not defined"),
            )
            .boxed_local();
        };

        let token = get_token(req);

        async move {
            let account = account_service.authenticate(&token?).await?;
            Ok(CurrentAccount(account))
        }
        .boxed_local()
    }
}
