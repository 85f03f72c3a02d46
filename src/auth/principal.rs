//! The authenticated identity attached to a request.

use serde::{Deserialize, Serialize};

use crate::domain::{Role, User};

/// User + role + tenant, as carried in verified JWT claims. Inserted
/// into request extensions by the auth middleware; never constructed
/// from unverified input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub company_id: String,
}

impl Principal {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            company_id: user.company_id.clone(),
        }
    }
}
