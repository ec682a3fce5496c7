use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::User;

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub confirmed: bool,
    pub avatar: Option<String>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            confirmed: u.confirmed,
            avatar: u.avatar,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    pub avatar_url: String,
}
