use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extract::loose_text;

/// Request body for user creation.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default, deserialize_with = "loose_text")]
    pub username: Option<String>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
}

impl From<crate::users::repo_types::User> for PublicUser {
    fn from(user: crate::users::repo_types::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}
