mod common;

use uuid::Uuid;

use application::service::{ApprovalService, UserService};
use application::transfer::{
    DecideApprovalDto, DeleteApprovalDto, GetAllApprovalDto, GetApprovalDto, GetUserDto,
    RegisterUserDto, SetUserStatusDto, SubmitApprovalDto, UpdateApprovalDto, UserDto,
};
use kernel::interface::notify::NotificationJob;
use kernel::prelude::entity::{
    Actor, AdminNotes, ApprovalRequestId, RequestData, RequestType, SelectLimit, SelectOffset,
    UserEmail, UserId, UserName, UserRole, UserStatus,
};
use kernel::KernelError;

use common::TestModule;

fn admin() -> Actor {
    Actor::new(UserId::new(Uuid::new_v4()), UserRole::Admin)
}

fn all() -> GetAllApprovalDto {
    GetAllApprovalDto {
        limit: SelectLimit::default(),
        offset: SelectOffset::default(),
    }
}

fn edit(id: Uuid) -> UpdateApprovalDto {
    UpdateApprovalDto {
        id: ApprovalRequestId::new(id),
        request_type: RequestType::new("book_add"),
        resource_id: None,
        request_data: RequestData::new(r#"{"title":"The Dispossessed"}"#),
    }
}

async fn register(module: &TestModule, email: &str) -> error_stack::Result<UserDto, KernelError> {
    module
        .register_user(RegisterUserDto {
            name: UserName::new("Sam"),
            email: UserEmail::new(email),
            role: UserRole::Member,
        })
        .await
}

#[tokio::test]
async fn registration_is_approval_gated() -> error_stack::Result<(), KernelError> {
    let (module, delivered) = TestModule::build();

    let user = register(&module, "sam@example.com").await?;
    assert_eq!(user.status, "pending");

    let report = register(&module, "sam@example.com").await.unwrap_err();
    assert!(matches!(report.current_context(), KernelError::Conflict));

    let requests = module.list_requests(all()).await?;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].request_type, "user_registration");
    assert_eq!(requests[0].user_id, user.id);
    assert_eq!(requests[0].status, "pending");

    let jobs = delivered.lock().unwrap();
    assert!(jobs
        .iter()
        .any(|job| matches!(job, NotificationJob::Welcome { .. })));
    Ok(())
}

#[tokio::test]
async fn requests_are_decided_exactly_once() -> error_stack::Result<(), KernelError> {
    let (module, delivered) = TestModule::build();
    let user = register(&module, "sam@example.com").await?;
    let request = module
        .list_requests(all())
        .await?
        .pop()
        .expect("registration request should exist");

    let member = Actor::new(UserId::new(user.id), UserRole::Member);
    let report = module
        .approve_request(
            &member,
            DecideApprovalDto {
                id: ApprovalRequestId::new(request.id),
                admin_notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(report.current_context(), KernelError::Forbidden));

    let decided = module
        .approve_request(
            &admin(),
            DecideApprovalDto {
                id: ApprovalRequestId::new(request.id),
                admin_notes: Some(AdminNotes::new("verified")),
            },
        )
        .await?;
    assert_eq!(decided.status, "approved");
    assert!(decided.admin_id.is_some());
    assert!(decided.processed_at.is_some());

    // The decision is final; the losing admin gets told so.
    let report = module
        .reject_request(
            &admin(),
            DecideApprovalDto {
                id: ApprovalRequestId::new(request.id),
                admin_notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(report.current_context(), KernelError::InvalidState));

    let jobs = delivered.lock().unwrap();
    let decision = jobs
        .iter()
        .find(|job| matches!(job, NotificationJob::ApprovalDecision { .. }))
        .expect("decision should be queued");
    if let NotificationJob::ApprovalDecision {
        approved,
        admin_notes,
        ..
    } = decision
    {
        assert!(*approved);
        assert_eq!(admin_notes.as_deref(), Some("verified"));
    }
    Ok(())
}

#[tokio::test]
async fn pending_requests_belong_to_their_submitter() -> error_stack::Result<(), KernelError> {
    let (module, _delivered) = TestModule::build();
    let user = register(&module, "sam@example.com").await?;
    let owner = Actor::new(UserId::new(user.id), UserRole::Member);

    let request = module
        .submit_request(
            &owner,
            SubmitApprovalDto {
                request_type: RequestType::new("book_add"),
                resource_id: None,
                request_data: RequestData::new(r#"{"title":"The Word for World Is Forest"}"#),
            },
        )
        .await?;

    let stranger = Actor::new(UserId::new(Uuid::new_v4()), UserRole::Member);
    let report = module
        .update_request(&stranger, edit(request.id))
        .await
        .unwrap_err();
    assert!(matches!(report.current_context(), KernelError::Forbidden));

    let updated = module.update_request(&owner, edit(request.id)).await?;
    assert_eq!(updated.request_data, r#"{"title":"The Dispossessed"}"#);

    let report = module
        .delete_request(
            &stranger,
            DeleteApprovalDto {
                id: ApprovalRequestId::new(request.id),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(report.current_context(), KernelError::Forbidden));

    module
        .approve_request(
            &admin(),
            DecideApprovalDto {
                id: ApprovalRequestId::new(request.id),
                admin_notes: None,
            },
        )
        .await?;

    // Decided requests are frozen, owner or not.
    let report = module
        .update_request(&owner, edit(request.id))
        .await
        .unwrap_err();
    assert!(matches!(report.current_context(), KernelError::InvalidState));
    let report = module
        .delete_request(
            &owner,
            DeleteApprovalDto {
                id: ApprovalRequestId::new(request.id),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(report.current_context(), KernelError::InvalidState));
    Ok(())
}

#[tokio::test]
async fn submitters_can_withdraw_pending_requests() -> error_stack::Result<(), KernelError> {
    let (module, _delivered) = TestModule::build();
    let user = register(&module, "sam@example.com").await?;
    let owner = Actor::new(UserId::new(user.id), UserRole::Member);

    let request = module
        .submit_request(
            &owner,
            SubmitApprovalDto {
                request_type: RequestType::new("book_remove"),
                resource_id: None,
                request_data: RequestData::new(r#"{"reason":"damaged"}"#),
            },
        )
        .await?;

    module
        .delete_request(
            &owner,
            DeleteApprovalDto {
                id: ApprovalRequestId::new(request.id),
            },
        )
        .await?;
    assert!(module
        .get_request(GetApprovalDto {
            id: ApprovalRequestId::new(request.id),
        })
        .await?
        .is_none());
    Ok(())
}

#[tokio::test]
async fn submissions_require_a_known_requester() -> error_stack::Result<(), KernelError> {
    let (module, _delivered) = TestModule::build();
    let ghost = Actor::new(UserId::new(Uuid::new_v4()), UserRole::Member);

    let report = module
        .submit_request(
            &ghost,
            SubmitApprovalDto {
                request_type: RequestType::new("book_add"),
                resource_id: None,
                request_data: RequestData::new("{}"),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(report.current_context(), KernelError::NotFound));
    Ok(())
}

#[tokio::test]
async fn status_changes_are_admin_gated() -> error_stack::Result<(), KernelError> {
    let (module, delivered) = TestModule::build();
    let user = register(&module, "sam@example.com").await?;

    let member = Actor::new(UserId::new(user.id), UserRole::Member);
    let report = module
        .set_user_status(
            &member,
            SetUserStatusDto {
                id: UserId::new(user.id),
                status: UserStatus::Active,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(report.current_context(), KernelError::Forbidden));

    let activated = module
        .set_user_status(
            &admin(),
            SetUserStatusDto {
                id: UserId::new(user.id),
                status: UserStatus::Active,
            },
        )
        .await?;
    assert_eq!(activated.status, "active");

    let fetched = module
        .get_user(GetUserDto {
            id: UserId::new(user.id),
        })
        .await?
        .expect("user should exist");
    assert_eq!(fetched.status, "active");

    let jobs = delivered.lock().unwrap();
    assert!(jobs.iter().any(|job| matches!(
        job,
        NotificationJob::AccountStatus { status, .. } if status == "active"
    )));
    Ok(())
}
