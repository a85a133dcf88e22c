use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::middlewares::auth::{CurrentAccount, TOKEN_COOKIE};
use crate::api::middlewares::validate::{Form, Json};
use crate::domain::error::AppError;
use crate::domain::services::account::AccountService;

use crate::api::dto::account::{
    AccountResponseDTO, CredentialsDTO, LogoutResponseDTO, RegisterForm, RegisterFormSchema,
    UpdateForm, UpdateFormSchema,
};

use actix_web::{
    HttpResponse,
    cookie::{Cookie, SameSite},
    delete, get, patch, post,
    web::Data as State,
};

use utoipa_actix_web::service_config::ServiceConfig;

pub fn routes(cfg: &mut ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(current)
        .service(update)
        .service(logout);
}

fn token_cookie(token: &str) -> Cookie<'_> {
    Cookie::build(TOKEN_COOKIE, token)
        .http_only(true)
        .secure(true)
        .path("/api")
        .same_site(SameSite::Strict)
        .finish()
}

#[utoipa::path(
    responses(
        (status = 201, body = AccountResponseDTO, description = "Account Created"),
        (status = 400, body = AppError, example = json!(AppError::example_400())),
        (status = 422, body = AppError, example = json!(AppError::example_422())),
        (status = 500, body = AppError, example = json!(AppError::example_upload_500())),
    ),
    request_body(content = RegisterFormSchema, content_type = "multipart/form-data"),
    tag = "Account",
)]
#[post("/users")]
pub async fn register(
    payload: Form<RegisterForm>,
    account_service: State<Arc<dyn AccountService>>,
) -> ApiResult {
    let form = payload.into_inner();

    let account = account_service.register((&form).into()).await?;

    Ok(HttpResponse::Created().json(AccountResponseDTO::from(account)))
}

#[utoipa::path(
    responses(
        (status = 200, body = AccountResponseDTO),
        (status = 400, body = AppError),
        (status = 401, body = AppError, example = json!(AppError::example_401())),
        (status = 500, body = AppError, example = json!(AppError::example_500())),
    ),
    request_body = CredentialsDTO,
    tag = "Account"
)]
#[post("/users/login")]
pub async fn login(
    payload: Json<CredentialsDTO>,
    account_service: State<Arc<dyn AccountService>>,
) -> ApiResult {
    let credentials_dto = payload.into_inner();

    let account = account_service.login(credentials_dto.into()).await?;

    let token = account.token.clone().unwrap_or_default();

    Ok(HttpResponse::Ok()
        .cookie(token_cookie(&token))
        .json(AccountResponseDTO::from(account)))
}

#[utoipa::path(
    responses(
        (status = 200, body = AccountResponseDTO),
        (status = 401, body = AppError, example = json!(AppError::example_401())),
        (status = 500, body = AppError, example = json!(AppError::example_500()))
    ),
    security(("token" = [])),
    tag = "Account"
)]
#[get("/users/current")]
pub async fn current(account: CurrentAccount) -> ApiResult {
    Ok(HttpResponse::Ok().json(AccountResponseDTO::from(account.into_inner())))
}

#[utoipa::path(
    responses(
        (status = 200, body = AccountResponseDTO),
        (status = 400, body = AppError, example = json!(AppError::example_400())),
        (status = 401, body = AppError, example = json!(AppError::example_401())),
        (status = 404, body = AppError, example = json!(AppError::example_404())),
        (status = 422, body = AppError, example = json!(AppError::example_422())),
        (status = 500, body = AppError, example = json!(AppError::example_avatar_upload_500()))
    ),
    request_body(content = UpdateFormSchema, content_type = "multipart/form-data"),
    security(("token" = [])),
    tag = "Account"
)]
#[patch("/users/current")]
pub async fn update(
    account: CurrentAccount,
    payload: Form<UpdateForm>,
    account_service: State<Arc<dyn AccountService>>,
) -> ApiResult {
    let form = payload.into_inner();

    let updated = account_service
        .update(&account.into_inner().id, (&form).into())
        .await?;

    Ok(HttpResponse::Ok().json(AccountResponseDTO::from(updated)))
}

#[utoipa::path(
    responses(
        (status = 200, body = LogoutResponseDTO),
        (status = 401, body = AppError, example = json!(AppError::example_401())),
        (status = 404, body = AppError, example = json!(AppError::example_404())),
        (status = 500, body = AppError, example = json!(AppError::example_500()))
    ),
    security(("token" = [])),
    tag = "Account"
)]
#[delete("/users/logout")]
pub async fn logout(
    account: CurrentAccount,
    account_service: State<Arc<dyn AccountService>>,
) -> ApiResult {
    account_service.logout(&account.into_inner().id).await?;

    let mut cookie = token_cookie("");
    cookie.make_removal();

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(LogoutResponseDTO { data: true }))
}
