mod email;
mod id;
mod name;
mod role;
mod status;

pub use self::{email::*, id::*, name::*, role::*, status::*};
use destructure::{Destructure, Mutation};

#[derive(Debug, Clone, Eq, PartialEq, Destructure, Mutation)]
pub struct User {
    id: UserId,
    name: UserName,
    email: UserEmail,
    role: UserRole,
    status: UserStatus,
}

impl User {
    pub fn new(id: UserId, name: UserName, email: UserEmail, role: UserRole, status: UserStatus) -> Self {
        Self {
            id,
            name,
            email,
            role,
            status,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &UserName {
        &self.name
    }

    pub fn email(&self) -> &UserEmail {
        &self.email
    }

    pub fn role(&self) -> &UserRole {
        &self.role
    }

    pub fn status(&self) -> &UserStatus {
        &self.status
    }
}

/// Pre-validated caller identity handed in by the boundary. The domain
/// trusts it: authentication happened upstream.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Actor {
    user_id: UserId,
    role: UserRole,
}

impl Actor {
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn role(&self) -> &UserRole {
        &self.role
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}
