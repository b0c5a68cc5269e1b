use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::request::{InfoRequest, InfoRequestBody, InfoTarget, InfosRequest, QueueTransformer};
use crate::response::{InfoResponse, QueuePresenter};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use kernel::interface::mq::MessageQueue;
use uuid::Uuid;

pub trait QueueRouter {
    fn route_queue(self) -> Self;
}

impl QueueRouter for Router<AppModule> {
    fn route_queue(self) -> Self {
        self.route(
            "/queue/stats",
            get(|State(module): State<AppModule>| async move {
                Controller::new((), QueuePresenter)
                    .bypass(|| async move { module.notification().stats().await })
                    .await
                    .map_err(ErrorStatus::from)
            }),
        )
        .route(
            "/queue/infos",
            get(
                |State(module): State<AppModule>, Query(req): Query<InfosRequest>| async move {
                    Controller::new(QueueTransformer, QueuePresenter)
                        .intake(req)
                        .handle(
                            |InfosRequest {
                                 target,
                                 size,
                                 offset,
                             }| async move {
                                match target {
                                    InfoTarget::Delayed => {
                                        module
                                            .notification()
                                            .get_delayed_infos(&size, &offset)
                                            .await
                                    }
                                    InfoTarget::Failed => {
                                        module
                                            .notification()
                                            .get_failed_infos(&size, &offset)
                                            .await
                                    }
                                }
                            },
                        )
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .delete(|State(module): State<AppModule>| async move {
                Controller::new((), QueuePresenter)
                    .bypass(|| async move { module.notification().clean().await })
                    .await
                    .map_err(ErrorStatus::from)
            }),
        )
        .route(
            "/queue/infos/:id",
            get(
                |State(module): State<AppModule>,
                 Path(id): Path<Uuid>,
                 Query(req): Query<InfoRequestBody>| async move {
                    Controller::new(QueueTransformer, QueuePresenter)
                        .intake(InfoRequest::new(id, req.target))
                        .handle(|InfoRequest { id, target }| async move {
                            match target {
                                InfoTarget::Delayed => {
                                    module.notification().get_delayed_info(&id).await
                                }
                                InfoTarget::Failed => module.notification().get_failed_info(&id).await,
                            }
                        })
                        .await
                        .map_err(ErrorStatus::from)
                        .map(|res| {
                            res.map(InfoResponse::into_response)
                                .unwrap_or_else(|| StatusCode::NOT_FOUND.into_response())
                        })
                },
            )
            .delete(
                |State(module): State<AppModule>, Path(id): Path<Uuid>| async move {
                    Controller::new(QueueTransformer, ())
                        .intake(id)
                        .bypass(|id| async move { module.notification().remove(&id).await })
                        .await
                        .map_err(ErrorStatus::from)
                        .map(found_status)
                },
            ),
        )
        .route(
            "/queue/infos/:id/retry",
            post(
                |State(module): State<AppModule>, Path(id): Path<Uuid>| async move {
                    Controller::new(QueueTransformer, ())
                        .intake(id)
                        .bypass(|id| async move { module.notification().retry(&id).await })
                        .await
                        .map_err(ErrorStatus::from)
                        .map(found_status)
                },
            ),
        )
    }
}

fn found_status(found: bool) -> Response {
    if found {
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}
