use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use super::repo_types::{iso_date, Contact};

const MAX_LIMIT: i64 = 100;

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: String,
    #[serde(with = "iso_date")]
    pub birthday: Date,
    pub additional_info: Option<String>,
    pub is_favorite: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Contact> for ContactResponse {
    fn from(c: Contact) -> Self {
        Self {
            id: c.id,
            firstname: c.firstname,
            lastname: c.lastname,
            email: c.email,
            phone: c.phone,
            birthday: c.birthday,
            additional_info: c.additional_info,
            is_favorite: c.is_favorite,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl Pagination {
    /// Limit clamped to `1..=100`, offset to `>= 0`.
    pub fn window(&self) -> (i64, i64) {
        (self.limit.clamp(1, MAX_LIMIT), self.offset.max(0))
    }
}
