use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::extract::ActorContext;
use crate::handler::AppModule;
use crate::request::{GetUserRequest, RegisterUserRequest, SetUserStatusRequest, UserTransformer};
use crate::response::{CreatedUserPresenter, UserPresenter, UserResponse};
use application::service::UserService;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use uuid::Uuid;

pub trait UserRouter {
    fn route_user(self) -> Self;
}

impl UserRouter for Router<AppModule> {
    fn route_user(self) -> Self {
        self.route(
            "/users",
            post(
                |State(module): State<AppModule>, Json(req): Json<RegisterUserRequest>| async move {
                    Controller::new(UserTransformer, CreatedUserPresenter)
                        .try_intake(req)
                        .map_err(ErrorStatus::from)?
                        .handle(|dto| async move { module.register_user(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/users/:id",
            get(
                |State(module): State<AppModule>, Path(id): Path<Uuid>| async move {
                    Controller::new(UserTransformer, UserPresenter)
                        .intake(GetUserRequest::new(id))
                        .handle(|dto| async move { module.get_user(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                        .map(|res| {
                            res.map(UserResponse::into_response)
                                .unwrap_or_else(|| StatusCode::NOT_FOUND.into_response())
                        })
                },
            ),
        )
        .route(
            "/users/:id/status",
            put(
                |State(module): State<AppModule>,
                 ActorContext(actor): ActorContext,
                 Path(id): Path<Uuid>,
                 Json(req): Json<SetUserStatusRequest>| async move {
                    Controller::new(UserTransformer, UserPresenter)
                        .try_intake((id, req))
                        .map_err(ErrorStatus::from)?
                        .handle(|dto| async move { module.set_user_status(&actor, dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
