use axum::http::request::Parts;
use axum::http::HeaderMap;
use error_stack::Report;
use kernel::prelude::entity::{Actor, UserId, UserRole};
use kernel::KernelError;
use uuid::Uuid;

use crate::error::ErrorStatus;

static USER_ID_HEADER: &str = "x-user-id";
static USER_ROLE_HEADER: &str = "x-user-role";

/// Caller identity taken from the gateway headers. Authentication
/// happened upstream; a missing or garbled header pair reads as an
/// anonymous caller and is rejected before the route body runs.
pub struct ActorContext(pub Actor);

fn parse_actor(headers: &HeaderMap) -> Result<Actor, Report<KernelError>> {
    let id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .ok_or_else(|| {
            Report::new(KernelError::Unauthorized)
                .attach_printable(format!("`{USER_ID_HEADER}` header is missing or malformed"))
        })?;
    let role = headers
        .get(USER_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            Report::new(KernelError::Unauthorized)
                .attach_printable(format!("`{USER_ROLE_HEADER}` header is missing"))
        })
        .and_then(|value| {
            UserRole::try_from(value.to_string()).map_err(|report| {
                report.change_context(KernelError::Unauthorized)
            })
        })?;
    Ok(Actor::new(UserId::new(id), role))
}

#[async_trait::async_trait]
impl<S> axum::extract::FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = ErrorStatus;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_actor(&parts.headers)
            .map(ActorContext)
            .map_err(ErrorStatus::from)
    }
}

#[cfg(test)]
mod test {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(id: Option<&str>, role: Option<&str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(id) = id {
            map.insert(USER_ID_HEADER, HeaderValue::from_str(id).unwrap());
        }
        if let Some(role) = role {
            map.insert(USER_ROLE_HEADER, HeaderValue::from_str(role).unwrap());
        }
        map
    }

    #[test]
    fn well_formed_headers_build_an_actor() {
        let id = Uuid::new_v4();
        let actor = parse_actor(&headers(Some(&id.to_string()), Some("admin"))).unwrap();
        assert!(actor.is_admin());
        assert_eq!(actor.user_id(), &UserId::new(id));
    }

    #[test]
    fn missing_or_garbled_headers_are_rejected() {
        assert!(parse_actor(&headers(None, Some("member"))).is_err());
        assert!(parse_actor(&headers(Some("not-a-uuid"), Some("member"))).is_err());
        let id = Uuid::new_v4().to_string();
        assert!(parse_actor(&headers(Some(&id), None)).is_err());
        assert!(parse_actor(&headers(Some(&id), Some("superuser"))).is_err());
    }
}
