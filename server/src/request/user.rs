use crate::controller::{Intake, TryIntake};
use application::transfer::{GetUserDto, RegisterUserDto, SetUserStatusDto};
use error_stack::Report;
use kernel::prelude::entity::{UserEmail, UserId, UserName, UserRole, UserStatus};
use kernel::KernelError;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    name: String,
    email: String,
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetUserStatusRequest {
    status: String,
}

#[derive(Debug)]
pub struct GetUserRequest {
    id: Uuid,
}

impl GetUserRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

pub struct UserTransformer;

impl TryIntake<RegisterUserRequest> for UserTransformer {
    type To = RegisterUserDto;
    type Error = Report<KernelError>;
    fn emit(&self, input: RegisterUserRequest) -> Result<Self::To, Self::Error> {
        let role = input
            .role
            .map(UserRole::try_from)
            .transpose()?
            .unwrap_or(UserRole::Member);
        Ok(RegisterUserDto {
            name: UserName::new(input.name),
            email: UserEmail::new(input.email),
            role,
        })
    }
}

impl TryIntake<(Uuid, SetUserStatusRequest)> for UserTransformer {
    type To = SetUserStatusDto;
    type Error = Report<KernelError>;
    fn emit(&self, (id, input): (Uuid, SetUserStatusRequest)) -> Result<Self::To, Self::Error> {
        Ok(SetUserStatusDto {
            id: UserId::new(id),
            status: UserStatus::try_from(input.status)?,
        })
    }
}

impl Intake<GetUserRequest> for UserTransformer {
    type To = GetUserDto;
    fn emit(&self, input: GetUserRequest) -> Self::To {
        GetUserDto {
            id: UserId::new(input.id),
        }
    }
}
