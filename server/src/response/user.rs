use crate::controller::Exhaust;
use application::transfer::UserDto;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    id: Uuid,
}

impl IntoResponse for CreatedUserResponse {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, axum::Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    status: String,
}

impl IntoResponse for UserResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, axum::Json(self)).into_response()
    }
}

pub struct CreatedUserPresenter;

impl Exhaust<UserDto> for CreatedUserPresenter {
    type To = CreatedUserResponse;
    fn emit(&self, input: UserDto) -> Self::To {
        CreatedUserResponse { id: input.id }
    }
}

pub struct UserPresenter;

impl Exhaust<UserDto> for UserPresenter {
    type To = UserResponse;
    fn emit(&self, input: UserDto) -> Self::To {
        UserResponse {
            id: input.id,
            name: input.name,
            email: input.email,
            role: input.role,
            status: input.status,
        }
    }
}

impl Exhaust<Option<UserDto>> for UserPresenter {
    type To = Option<UserResponse>;
    fn emit(&self, input: Option<UserDto>) -> Self::To {
        input.map(|user| self.emit(user))
    }
}
