use crate::controller::Exhaust;
use axum::response::IntoResponse;
use kernel::interface::mq::{DestructErroredInfo, ErroredInfo, QueueStats};
use kernel::interface::notify::NotificationJob;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct QueueStatsResponse {
    pub queued: usize,
    pub delayed: usize,
    pub failed: usize,
}

impl IntoResponse for QueueStatsResponse {
    fn into_response(self) -> axum::response::Response {
        (axum::http::StatusCode::OK, axum::Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub id: Uuid,
    pub data: NotificationJob,
    pub stack_trace: String,
}

impl IntoResponse for InfoResponse {
    fn into_response(self) -> axum::response::Response {
        (axum::http::StatusCode::OK, axum::Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct CleanedResponse {
    pub removed: u64,
}

impl IntoResponse for CleanedResponse {
    fn into_response(self) -> axum::response::Response {
        (axum::http::StatusCode::OK, axum::Json(self)).into_response()
    }
}

pub struct QueuePresenter;

impl Exhaust<QueueStats> for QueuePresenter {
    type To = QueueStatsResponse;
    fn emit(&self, input: QueueStats) -> Self::To {
        QueueStatsResponse {
            queued: input.queued,
            delayed: input.delayed,
            failed: input.failed,
        }
    }
}

impl Exhaust<ErroredInfo<NotificationJob>> for QueuePresenter {
    type To = InfoResponse;
    fn emit(&self, input: ErroredInfo<NotificationJob>) -> Self::To {
        let DestructErroredInfo {
            id,
            data,
            stack_trace,
        } = input.into_destruct();
        InfoResponse {
            id,
            data,
            stack_trace,
        }
    }
}

impl Exhaust<Vec<ErroredInfo<NotificationJob>>> for QueuePresenter {
    type To = axum::Json<Vec<InfoResponse>>;
    fn emit(&self, input: Vec<ErroredInfo<NotificationJob>>) -> Self::To {
        let infos = input
            .into_iter()
            .map(|info| self.emit(info))
            .collect::<Vec<_>>();
        axum::Json(infos)
    }
}

impl Exhaust<Option<ErroredInfo<NotificationJob>>> for QueuePresenter {
    type To = Option<InfoResponse>;
    fn emit(&self, input: Option<ErroredInfo<NotificationJob>>) -> Self::To {
        input.map(|info| self.emit(info))
    }
}

impl Exhaust<u64> for QueuePresenter {
    type To = CleanedResponse;
    fn emit(&self, input: u64) -> Self::To {
        CleanedResponse { removed: input }
    }
}
