//! Current User Use Case

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

pub struct CurrentUserUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> CurrentUserUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// Load the user behind an authenticated session.
    ///
    /// `UserNotFound` means the session outlived its account.
    pub async fn execute(&self, user_id: &UserId) -> AuthResult<User> {
        self.user_repo.find_by_id(user_id).await?.ok_or_else(|| {
            tracing::warn!(user_id = %user_id, "Session refers to a missing user");
            AuthError::UserNotFound
        })
    }
}
