use serde::{Deserialize, Serialize};

use crate::repositories::User;

/// The authenticated user, attached to the request by the auth middleware.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: i64,
    pub username: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl UserContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        }
    }

    pub fn is_elevated(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}
