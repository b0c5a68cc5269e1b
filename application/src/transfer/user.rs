use uuid::Uuid;

use kernel::prelude::entity::{
    DestructUser, User, UserEmail, UserId, UserName, UserRole, UserStatus,
};

#[derive(Debug, Clone)]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let DestructUser {
            id,
            name,
            email,
            role,
            status,
        } = value.into_destruct();
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role: role.as_ref().to_string(),
            status: status.as_ref().to_string(),
        }
    }
}

pub struct RegisterUserDto {
    pub name: UserName,
    pub email: UserEmail,
    pub role: UserRole,
}

pub struct SetUserStatusDto {
    pub id: UserId,
    pub status: UserStatus,
}

pub struct GetUserDto {
    pub id: UserId,
}
