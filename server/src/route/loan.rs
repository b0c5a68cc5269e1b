use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::request::{
    CreateLoanRequest, DeleteLoanRequest, GetLoanRequest, LoanTransformer, ReassignLoanRequest,
    ReturnLoanRequest,
};
use crate::response::{CreatedLoanPresenter, LoanPresenter, LoanResponse};
use application::service::LoanService;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use uuid::Uuid;

pub trait LoanRouter {
    fn route_loan(self) -> Self;
}

impl LoanRouter for Router<AppModule> {
    fn route_loan(self) -> Self {
        self.route(
            "/loans",
            post(
                |State(module): State<AppModule>, Json(req): Json<CreateLoanRequest>| async move {
                    Controller::new(LoanTransformer, CreatedLoanPresenter)
                        .intake(req)
                        .handle(|dto| async move { module.borrow_book(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/loans/:id",
            get(
                |State(module): State<AppModule>, Path(id): Path<Uuid>| async move {
                    Controller::new(LoanTransformer, LoanPresenter)
                        .intake(GetLoanRequest::new(id))
                        .handle(|dto| async move { module.get_loan(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                        .map(|res| {
                            res.map(LoanResponse::into_response)
                                .unwrap_or_else(|| StatusCode::NOT_FOUND.into_response())
                        })
                },
            )
            .patch(
                |State(module): State<AppModule>,
                 Path(id): Path<Uuid>,
                 Json(req): Json<ReassignLoanRequest>| async move {
                    Controller::new(LoanTransformer, LoanPresenter)
                        .intake((id, req))
                        .handle(|dto| async move { module.reassign_book(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .delete(
                |State(module): State<AppModule>, Path(id): Path<Uuid>| async move {
                    Controller::new(LoanTransformer, LoanPresenter)
                        .intake(DeleteLoanRequest::new(id))
                        .handle(|dto| async move { module.delete_loan(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/loans/:id/return",
            put(
                |State(module): State<AppModule>, Path(id): Path<Uuid>| async move {
                    Controller::new(LoanTransformer, LoanPresenter)
                        .intake(ReturnLoanRequest::new(id))
                        .handle(|dto| async move { module.return_book(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
