use tracing::{debug, instrument};

use super::repo::ContactRepository;
use super::repo_types::{Contact, ContactFields};
use crate::error::RepoResult;
use crate::users::repo_types::Owner;

#[instrument(skip(repo))]
pub async fn list(
    repo: &dyn ContactRepository,
    owner: Owner,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<Contact>> {
    let contacts = repo.list(owner, limit, offset).await?;
    debug!(count = contacts.len(), "contacts listed");
    Ok(contacts)
}

/// `None` when the contact does not exist or belongs to another user.
#[instrument(skip(repo))]
pub async fn get_by_id(
    repo: &dyn ContactRepository,
    owner: Owner,
    contact_id: i64,
) -> RepoResult<Option<Contact>> {
    repo.get(owner, contact_id).await
}

#[instrument(skip(repo, fields))]
pub async fn create(
    repo: &dyn ContactRepository,
    owner: Owner,
    fields: &ContactFields,
) -> RepoResult<Contact> {
    let contact = repo.create(owner, fields).await?;
    debug!(contact_id = contact.id, "contact created");
    Ok(contact)
}

/// Full replace: fields missing from `fields` are not carried over.
#[instrument(skip(repo, fields))]
pub async fn update(
    repo: &dyn ContactRepository,
    owner: Owner,
    contact_id: i64,
    fields: &ContactFields,
) -> RepoResult<Option<Contact>> {
    repo.update(owner, contact_id, fields).await
}

#[instrument(skip(repo))]
pub async fn remove(
    repo: &dyn ContactRepository,
    owner: Owner,
    contact_id: i64,
) -> RepoResult<Option<Contact>> {
    let removed = repo.delete(owner, contact_id).await?;
    if removed.is_some() {
        debug!(contact_id, "contact removed");
    }
    Ok(removed)
}

#[instrument(skip(repo))]
pub async fn set_favorite(
    repo: &dyn ContactRepository,
    owner: Owner,
    contact_id: i64,
    is_favorite: bool,
) -> RepoResult<Option<Contact>> {
    repo.set_favorite(owner, contact_id, is_favorite).await
}
