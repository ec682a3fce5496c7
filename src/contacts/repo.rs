use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{Contact, ContactFields};
use crate::error::RepoResult;
use crate::search::window::BirthdayWindow;
use crate::users::repo_types::Owner;

const CONTACT_COLUMNS: &str = "id, user_id, firstname, lastname, email, phone, birthday, \
                               additional_info, is_favorite, created_at";

/// Owner-scoped persistence for contacts.
///
/// Every method takes the [`Owner`] and filters on it; a contact belonging to
/// someone else behaves exactly like a missing one.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn list(&self, owner: Owner, limit: i64, offset: i64) -> RepoResult<Vec<Contact>>;

    async fn get(&self, owner: Owner, id: i64) -> RepoResult<Option<Contact>>;

    async fn create(&self, owner: Owner, fields: &ContactFields) -> RepoResult<Contact>;

    /// Replace every mutable field.
    async fn update(
        &self,
        owner: Owner,
        id: i64,
        fields: &ContactFields,
    ) -> RepoResult<Option<Contact>>;

    /// Delete and return the removed row.
    async fn delete(&self, owner: Owner, id: i64) -> RepoResult<Option<Contact>>;

    async fn set_favorite(
        &self,
        owner: Owner,
        id: i64,
        is_favorite: bool,
    ) -> RepoResult<Option<Contact>>;

    async fn birthdays_within(
        &self,
        owner: Owner,
        window: &BirthdayWindow,
    ) -> RepoResult<Vec<Contact>>;

    /// Case-insensitive substring match on firstname, lastname, email or phone.
    async fn search(&self, owner: Owner, text: &str) -> RepoResult<Vec<Contact>>;
}

#[derive(Clone)]
pub struct PgContactRepository {
    db: PgPool,
}

impl PgContactRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn list(&self, owner: Owner, limit: i64, offset: i64) -> RepoResult<Vec<Contact>> {
        let rows = sqlx::query_as::<_, Contact>(&format!(
            r#"
            SELECT {CONTACT_COLUMNS}
            FROM contacts
            WHERE user_id = $1
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(owner.id())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get(&self, owner: Owner, id: i64) -> RepoResult<Option<Contact>> {
        let row = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner.id())
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn create(&self, owner: Owner, fields: &ContactFields) -> RepoResult<Contact> {
        let row = sqlx::query_as::<_, Contact>(&format!(
            r#"
            INSERT INTO contacts
                (user_id, firstname, lastname, email, phone, birthday, additional_info, is_favorite)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(owner.id())
        .bind(&fields.firstname)
        .bind(&fields.lastname)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(fields.birthday)
        .bind(&fields.additional_info)
        .bind(fields.is_favorite)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn update(
        &self,
        owner: Owner,
        id: i64,
        fields: &ContactFields,
    ) -> RepoResult<Option<Contact>> {
        let row = sqlx::query_as::<_, Contact>(&format!(
            r#"
            UPDATE contacts
               SET firstname = $3,
                   lastname = $4,
                   email = $5,
                   phone = $6,
                   birthday = $7,
                   additional_info = $8,
                   is_favorite = $9
             WHERE id = $1 AND user_id = $2
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner.id())
        .bind(&fields.firstname)
        .bind(&fields.lastname)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(fields.birthday)
        .bind(&fields.additional_info)
        .bind(fields.is_favorite)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete(&self, owner: Owner, id: i64) -> RepoResult<Option<Contact>> {
        let row = sqlx::query_as::<_, Contact>(&format!(
            "DELETE FROM contacts WHERE id = $1 AND user_id = $2 RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(id)
        .bind(owner.id())
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn set_favorite(
        &self,
        owner: Owner,
        id: i64,
        is_favorite: bool,
    ) -> RepoResult<Option<Contact>> {
        let row = sqlx::query_as::<_, Contact>(&format!(
            r#"
            UPDATE contacts SET is_favorite = $3
             WHERE id = $1 AND user_id = $2
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner.id())
        .bind(is_favorite)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn birthdays_within(
        &self,
        owner: Owner,
        window: &BirthdayWindow,
    ) -> RepoResult<Vec<Contact>> {
        let [(lo1, hi1), (lo2, hi2)] = window.bounds();
        let rows = sqlx::query_as::<_, Contact>(&format!(
            r#"
            SELECT {CONTACT_COLUMNS}
              FROM contacts
             WHERE user_id = $1
               AND (
                   (EXTRACT(MONTH FROM birthday)::int * 100 + EXTRACT(DAY FROM birthday)::int)
                       BETWEEN $2 AND $3
                OR (EXTRACT(MONTH FROM birthday)::int * 100 + EXTRACT(DAY FROM birthday)::int)
                       BETWEEN $4 AND $5
               )
             ORDER BY id
            "#
        ))
        .bind(owner.id())
        .bind(lo1)
        .bind(hi1)
        .bind(lo2)
        .bind(hi2)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn search(&self, owner: Owner, text: &str) -> RepoResult<Vec<Contact>> {
        let rows = sqlx::query_as::<_, Contact>(&format!(
            r#"
            SELECT {CONTACT_COLUMNS}
              FROM contacts
             WHERE user_id = $1
               AND (firstname ILIKE $2 ESCAPE '\'
                 OR lastname ILIKE $2 ESCAPE '\'
                 OR email ILIKE $2 ESCAPE '\'
                 OR phone ILIKE $2 ESCAPE '\')
             ORDER BY id
            "#
        ))
        .bind(owner.id())
        .bind(substring_pattern(text))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

/// `%text%` with LIKE metacharacters escaped, so the text matches literally.
pub fn substring_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
