//! In-memory repositories for unit tests. They follow the same owner-scoping
//! and matching rules as the Postgres implementations.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::contacts::repo::ContactRepository;
use crate::contacts::repo_types::{Contact, ContactFields};
use crate::error::RepoResult;
use crate::notify::Notifier;
use crate::search::window::BirthdayWindow;
use crate::users::repo::UserRepository;
use crate::users::repo_types::{NewUser, Owner, User};

pub fn sample_fields(firstname: &str, lastname: &str, birthday: Date) -> ContactFields {
    ContactFields {
        firstname: firstname.to_string(),
        lastname: lastname.to_string(),
        email: format!("{}.{}@example.com", firstname, lastname).to_lowercase(),
        phone: "000-0000".to_string(),
        birthday,
        additional_info: None,
        is_favorite: false,
    }
}

#[derive(Clone, Default)]
pub struct MemoryContactRepository {
    inner: Arc<Mutex<ContactTable>>,
}

#[derive(Default)]
struct ContactTable {
    next_id: i64,
    rows: BTreeMap<i64, Contact>,
}

impl MemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows come out in id order, the same as `ORDER BY id` in the SQL queries.
    fn owned(&self, owner: Owner) -> Vec<Contact> {
        let table = self.inner.lock().unwrap();
        table
            .rows
            .values()
            .filter(|c| c.user_id == owner.id())
            .cloned()
            .collect()
    }

    fn modify(
        &self,
        owner: Owner,
        id: i64,
        apply: impl FnOnce(&mut Contact),
    ) -> Option<Contact> {
        let mut table = self.inner.lock().unwrap();
        let row = table
            .rows
            .get_mut(&id)
            .filter(|c| c.user_id == owner.id())?;
        apply(&mut *row);
        Some(row.clone())
    }
}

#[async_trait]
impl ContactRepository for MemoryContactRepository {
    async fn list(&self, owner: Owner, limit: i64, offset: i64) -> RepoResult<Vec<Contact>> {
        Ok(self
            .owned(owner)
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn get(&self, owner: Owner, id: i64) -> RepoResult<Option<Contact>> {
        let table = self.inner.lock().unwrap();
        Ok(table
            .rows
            .get(&id)
            .filter(|c| c.user_id == owner.id())
            .cloned())
    }

    async fn create(&self, owner: Owner, fields: &ContactFields) -> RepoResult<Contact> {
        let mut table = self.inner.lock().unwrap();
        table.next_id += 1;
        let contact = Contact {
            id: table.next_id,
            user_id: owner.id(),
            firstname: fields.firstname.clone(),
            lastname: fields.lastname.clone(),
            email: fields.email.clone(),
            phone: fields.phone.clone(),
            birthday: fields.birthday,
            additional_info: fields.additional_info.clone(),
            is_favorite: fields.is_favorite,
            created_at: OffsetDateTime::now_utc(),
        };
        table.rows.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn update(
        &self,
        owner: Owner,
        id: i64,
        fields: &ContactFields,
    ) -> RepoResult<Option<Contact>> {
        Ok(self.modify(owner, id, |c| {
            c.firstname = fields.firstname.clone();
            c.lastname = fields.lastname.clone();
            c.email = fields.email.clone();
            c.phone = fields.phone.clone();
            c.birthday = fields.birthday;
            c.additional_info = fields.additional_info.clone();
            c.is_favorite = fields.is_favorite;
        }))
    }

    async fn delete(&self, owner: Owner, id: i64) -> RepoResult<Option<Contact>> {
        let mut table = self.inner.lock().unwrap();
        let owned = table
            .rows
            .get(&id)
            .map_or(false, |c| c.user_id == owner.id());
        Ok(if owned { table.rows.remove(&id) } else { None })
    }

    async fn set_favorite(
        &self,
        owner: Owner,
        id: i64,
        is_favorite: bool,
    ) -> RepoResult<Option<Contact>> {
        Ok(self.modify(owner, id, |c| c.is_favorite = is_favorite))
    }

    async fn birthdays_within(
        &self,
        owner: Owner,
        window: &BirthdayWindow,
    ) -> RepoResult<Vec<Contact>> {
        Ok(self
            .owned(owner)
            .into_iter()
            .filter(|c| window.contains(c.birthday))
            .collect())
    }

    async fn search(&self, owner: Owner, text: &str) -> RepoResult<Vec<Contact>> {
        let needle = text.to_lowercase();
        Ok(self
            .owned(owner)
            .into_iter()
            .filter(|c| {
                [&c.firstname, &c.lastname, &c.email, &c.phone]
                    .iter()
                    .any(|v| v.to_lowercase().contains(&needle))
            })
            .collect())
    }
}

#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    users: Arc<Mutex<Vec<User>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn modify(&self, pred: impl Fn(&User) -> bool, apply: impl FnOnce(&mut User)) -> Option<User> {
        let mut users = self.users.lock().unwrap();
        let user = users.iter_mut().find(|u| pred(&**u))?;
        apply(&mut *user);
        Some(user.clone())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn get_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, new_user: &NewUser) -> RepoResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            refresh_token: None,
            password_reset_token: None,
            confirmed: false,
            avatar: new_user.avatar.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn update_token(&self, id: Uuid, refresh_token: Option<&str>) -> RepoResult<()> {
        self.modify(|u| u.id == id, |u| u.refresh_token = refresh_token.map(str::to_string));
        Ok(())
    }

    async fn confirm_email(&self, email: &str) -> RepoResult<()> {
        self.modify(|u| u.email == email, |u| u.confirmed = true);
        Ok(())
    }

    async fn update_avatar(&self, email: &str, url: &str) -> RepoResult<Option<User>> {
        Ok(self.modify(|u| u.email == email, |u| u.avatar = Some(url.to_string())))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> RepoResult<()> {
        self.modify(|u| u.id == id, |u| u.password_hash = password_hash.to_string());
        Ok(())
    }

    async fn update_reset_token(&self, id: Uuid, reset_token: Option<&str>) -> RepoResult<()> {
        self.modify(
            |u| u.id == id,
            |u| u.password_reset_token = reset_token.map(str::to_string),
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    EmailConfirmation { email: String, token: String },
    PasswordReset { email: String, token: String },
}

/// Records every notification instead of delivering it.
#[derive(Clone, Default)]
pub struct Outbox {
    sent: Arc<Mutex<Vec<Sent>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for Outbox {
    async fn email_confirmation(&self, email: &str, token: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(Sent::EmailConfirmation {
            email: email.to_string(),
            token: token.to_string(),
        });
        Ok(())
    }

    async fn password_reset(&self, email: &str, token: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(Sent::PasswordReset {
            email: email.to_string(),
            token: token.to_string(),
        });
        Ok(())
    }
}
