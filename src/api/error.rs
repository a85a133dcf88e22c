use actix_web::HttpResponse;

use crate::domain::error::AppResult;

/// Handler result; errors render through `AppError`'s `ResponseError` impl.
pub type ApiResult<T = HttpResponse> = AppResult<T>;
