// fitgestao/src/error.rs

use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use serde::Serialize;

#[derive(Debug, Display)]
pub enum FitgestaoError {
    #[display(fmt = "Not Found")]
    NotFound,
    #[display(fmt = "Bad Request: {}", _0)]
    BadRequest(String),
    #[display(fmt = "Authentication required")]
    Unauthorized,
    #[display(fmt = "Forbidden: {}", _0)]
    Forbidden(String),
    #[display(fmt = "Internal Server Error")]
    InternalError,
}

impl std::error::Error for FitgestaoError {}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl ResponseError for FitgestaoError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            FitgestaoError::NotFound => StatusCode::NOT_FOUND,
            FitgestaoError::BadRequest(_) => StatusCode::BAD_REQUEST,
            FitgestaoError::Unauthorized => StatusCode::UNAUTHORIZED,
            FitgestaoError::Forbidden(_) => StatusCode::FORBIDDEN,
            FitgestaoError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
