use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::extract::ActorContext;
use crate::handler::AppModule;
use crate::request::{
    ApprovalTransformer, DecideApprovalRequest, DeleteApprovalRequest, GetAllApprovalRequest,
    GetApprovalRequest, SubmitApprovalRequest, UpdateApprovalRequest,
};
use crate::response::{ApprovalPresenter, ApprovalResponse, CreatedApprovalPresenter};
use application::service::ApprovalService;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use uuid::Uuid;

pub trait ApprovalRouter {
    fn route_approval(self) -> Self;
}

impl ApprovalRouter for Router<AppModule> {
    fn route_approval(self) -> Self {
        self.route(
            "/approvals",
            get(
                |State(module): State<AppModule>,
                 Query(req): Query<GetAllApprovalRequest>| async move {
                    Controller::new(ApprovalTransformer, ApprovalPresenter)
                        .intake(req)
                        .try_handle(|dto| async move { module.list_requests(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .post(
                |State(module): State<AppModule>,
                 ActorContext(actor): ActorContext,
                 Json(req): Json<SubmitApprovalRequest>| async move {
                    Controller::new(ApprovalTransformer, CreatedApprovalPresenter)
                        .intake(req)
                        .try_handle(|dto| async move { module.submit_request(&actor, dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/approvals/:id",
            get(
                |State(module): State<AppModule>, Path(id): Path<Uuid>| async move {
                    Controller::new(ApprovalTransformer, ApprovalPresenter)
                        .intake(GetApprovalRequest::new(id))
                        .try_handle(|dto| async move { module.get_request(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                        .map(|res| {
                            res.map(ApprovalResponse::into_response)
                                .unwrap_or_else(|| StatusCode::NOT_FOUND.into_response())
                        })
                },
            )
            .patch(
                |State(module): State<AppModule>,
                 ActorContext(actor): ActorContext,
                 Path(id): Path<Uuid>,
                 Json(req): Json<UpdateApprovalRequest>| async move {
                    Controller::new(ApprovalTransformer, ApprovalPresenter)
                        .intake((id, req))
                        .try_handle(|dto| async move { module.update_request(&actor, dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .delete(
                |State(module): State<AppModule>,
                 ActorContext(actor): ActorContext,
                 Path(id): Path<Uuid>| async move {
                    Controller::new(ApprovalTransformer, ApprovalPresenter)
                        .intake(DeleteApprovalRequest::new(id))
                        .try_handle(|dto| async move { module.delete_request(&actor, dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/approvals/:id/approve",
            put(
                |State(module): State<AppModule>,
                 ActorContext(actor): ActorContext,
                 Path(id): Path<Uuid>,
                 Json(req): Json<DecideApprovalRequest>| async move {
                    Controller::new(ApprovalTransformer, ApprovalPresenter)
                        .intake((id, req))
                        .try_handle(|dto| async move { module.approve_request(&actor, dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/approvals/:id/reject",
            put(
                |State(module): State<AppModule>,
                 ActorContext(actor): ActorContext,
                 Path(id): Path<Uuid>,
                 Json(req): Json<DecideApprovalRequest>| async move {
                    Controller::new(ApprovalTransformer, ApprovalPresenter)
                        .intake((id, req))
                        .try_handle(|dto| async move { module.reject_request(&actor, dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
