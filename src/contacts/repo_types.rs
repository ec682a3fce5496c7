use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// `YYYY-MM-DD` serde format for birthdays.
pub(crate) mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{macros::format_description, Date};

    pub fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
        let text = date
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(serde::ser::Error::custom)?;
        s.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let text = String::deserialize(d)?;
        Date::parse(&text, format_description!("[year]-[month]-[day]"))
            .map_err(serde::de::Error::custom)
    }
}

/// Contact record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Contact {
    pub id: i64,
    pub user_id: Uuid,
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

/// Every mutable attribute of a contact. Updates replace all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: String,
    #[serde(with = "iso_date")]
    pub birthday: Date,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FavoriteFlag {
    pub is_favorite: bool,
}

#[cfg(test)]
impl Contact {
    pub fn fields(&self) -> ContactFields {
        ContactFields {
            firstname: self.firstname.clone(),
            lastname: self.lastname.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            birthday: self.birthday,
            additional_info: self.additional_info.clone(),
            is_favorite: self.is_favorite,
        }
    }
}
