use time::Date;
use tracing::{debug, instrument};

use super::window::BirthdayWindow;
use crate::contacts::repo::ContactRepository;
use crate::contacts::repo_types::Contact;
use crate::error::SearchResult;
use crate::users::repo_types::Owner;

/// Owned contacts whose birthday falls in `[today, today + shift_days]`.
///
/// An empty result is a normal answer, not "not found".
#[instrument(skip(repo))]
pub async fn birthday_window(
    repo: &dyn ContactRepository,
    owner: Owner,
    today: Date,
    shift_days: i64,
) -> SearchResult<Vec<Contact>> {
    let window = BirthdayWindow::new(today, shift_days)?;
    let contacts = repo.birthdays_within(owner, &window).await?;
    debug!(count = contacts.len(), wraps_year = window.wraps_year(), "birthday window");
    Ok(contacts)
}

/// Owned contacts whose firstname, lastname, email or phone contains `text`,
/// ignoring case. Empty text matches every contact.
#[instrument(skip(repo))]
pub async fn partial_match(
    repo: &dyn ContactRepository,
    owner: Owner,
    text: &str,
) -> SearchResult<Vec<Contact>> {
    let contacts = repo.search(owner, text).await?;
    debug!(count = contacts.len(), "partial match");
    Ok(contacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::repo_types::ContactFields;
    use crate::error::SearchError;
    use crate::testing::{sample_fields, MemoryContactRepository};
    use time::macros::date;
    use uuid::Uuid;

    fn owner() -> Owner {
        Owner::authenticated(Uuid::new_v4())
    }

    #[tokio::test]
    async fn birthday_window_scenario_per_owner() {
        let repo = MemoryContactRepository::new();
        let alice = owner();
        let bob = owner();
        let anna = repo
            .create(alice, &sample_fields("Anna", "Lee", date!(1988 - 12 - 25)))
            .await
            .unwrap();

        let today = date!(2024 - 12 - 20);
        let found = birthday_window(&repo, alice, today, 10).await.unwrap();
        assert_eq!(found, vec![anna]);

        let found = birthday_window(&repo, bob, today, 10).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn birthday_window_zero_is_exactly_today() {
        let repo = MemoryContactRepository::new();
        let alice = owner();
        let today_one = repo
            .create(alice, &sample_fields("Today", "One", date!(1970 - 07 - 04)))
            .await
            .unwrap();
        repo.create(alice, &sample_fields("Tomorrow", "Two", date!(1970 - 07 - 05)))
            .await
            .unwrap();
        repo.create(alice, &sample_fields("Yesterday", "Three", date!(1970 - 07 - 03)))
            .await
            .unwrap();

        let found = birthday_window(&repo, alice, date!(2025 - 07 - 04), 0)
            .await
            .unwrap();
        assert_eq!(found, vec![today_one]);
    }

    #[tokio::test]
    async fn birthday_window_wraps_into_january() {
        let repo = MemoryContactRepository::new();
        let alice = owner();
        let january = repo
            .create(alice, &sample_fields("Jan", "Early", date!(1995 - 01 - 05)))
            .await
            .unwrap();
        repo.create(alice, &sample_fields("Mar", "Late", date!(1995 - 03 - 05)))
            .await
            .unwrap();

        let found = birthday_window(&repo, alice, date!(2024 - 12 - 20), 40)
            .await
            .unwrap();
        assert_eq!(found, vec![january]);
    }

    #[tokio::test]
    async fn birthday_window_rejects_negative_shift() {
        let repo = MemoryContactRepository::new();
        let err = birthday_window(&repo, owner(), date!(2024 - 01 - 01), -5)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::NegativeShift(-5)));
    }

    #[tokio::test]
    async fn partial_match_is_case_insensitive_substring() {
        let repo = MemoryContactRepository::new();
        let alice = owner();
        let smith = repo
            .create(alice, &sample_fields("John", "Smith", date!(1980 - 01 - 01)))
            .await
            .unwrap();
        let bob = repo
            .create(
                alice,
                &ContactFields {
                    email: "bobsmith@x.com".into(),
                    ..sample_fields("Bob", "Brown", date!(1980 - 02 - 02))
                },
            )
            .await
            .unwrap();
        repo.create(alice, &sample_fields("Jane", "Smythe", date!(1980 - 03 - 03)))
            .await
            .unwrap();

        let found = partial_match(&repo, alice, "smith").await.unwrap();
        assert_eq!(found, vec![smith, bob]);
    }

    #[tokio::test]
    async fn partial_match_checks_phone_and_respects_owner() {
        let repo = MemoryContactRepository::new();
        let alice = owner();
        let with_phone = repo
            .create(
                alice,
                &ContactFields {
                    phone: "+380 67 555 1234".into(),
                    ..sample_fields("Ivan", "Petrenko", date!(1980 - 01 - 01))
                },
            )
            .await
            .unwrap();

        let found = partial_match(&repo, alice, "555").await.unwrap();
        assert_eq!(found, vec![with_phone]);
        assert!(partial_match(&repo, owner(), "555").await.unwrap().is_empty());
    }

    // Empty text is a substring of every value, so it deliberately matches all.
    #[tokio::test]
    async fn partial_match_with_empty_text_matches_all_owned_contacts() {
        let repo = MemoryContactRepository::new();
        let alice = owner();
        for name in ["A", "B"] {
            repo.create(alice, &sample_fields(name, "Doe", date!(1990 - 01 - 01)))
                .await
                .unwrap();
        }
        repo.create(owner(), &sample_fields("C", "Doe", date!(1990 - 01 - 01)))
            .await
            .unwrap();

        assert_eq!(partial_match(&repo, alice, "").await.unwrap().len(), 2);
    }
}
