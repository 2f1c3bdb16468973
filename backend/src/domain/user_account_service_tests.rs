//! Tests for the account service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::{MockUserRepository, StoredCredentials};
use crate::domain::{EmailAddress, ErrorCode, Username};

fn user(id: i64, name: &str) -> User {
    User::new(
        UserId::new(id).expect("id"),
        Username::new(name).expect("username"),
        Some(EmailAddress::new(format!("{name}@example.org")).expect("email")),
        false,
    )
}

fn credentials(username: &str, password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(username, password).expect("credential shape")
}

#[rstest]
#[case("hunter22", true)]
#[case("hunter23", false)]
#[tokio::test]
async fn authenticate_verifies_digest(#[case] password: &str, #[case] should_succeed: bool) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_credentials()
        .withf(|username| username == "ada")
        .times(1)
        .return_once(|_| {
            Ok(Some(StoredCredentials {
                user: user(4, "ada"),
                password_digest: PasswordDigest::derive("hunter22").expect("digest"),
            }))
        });

    let service = UserAccountService::new(Arc::new(repo));
    let result = service.authenticate(&credentials("ada", password)).await;

    match (should_succeed, result) {
        (true, Ok(found)) => assert_eq!(found.id().get(), 4),
        (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthorized),
        (true, Err(err)) => panic!("expected success, got error: {err:?}"),
        (false, Ok(found)) => panic!("expected failure, got user {}", found.id()),
    }
}

#[tokio::test]
async fn authenticate_rejects_unknown_users() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_credentials()
        .times(1)
        .return_once(|_| Ok(None));

    let service = UserAccountService::new(Arc::new(repo));
    let err = service
        .authenticate(&credentials("ghost", "whatever"))
        .await
        .expect_err("unknown user");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn sign_up_stores_a_verifiable_digest() {
    let mut repo = MockUserRepository::new();
    repo.expect_create()
        .withf(|record| {
            record.username.as_ref() == "grace" && record.password_digest.verify("s3cret!")
        })
        .times(1)
        .return_once(|_| Ok(user(9, "grace")));

    let service = UserAccountService::new(Arc::new(repo));
    let account = NewAccount::try_from_parts("grace", None, "s3cret!").expect("valid account");
    let created = service.sign_up(&account).await.expect("sign-up succeeds");

    assert_eq!(created.username().as_ref(), "grace");
}

#[tokio::test]
async fn sign_up_maps_duplicates_to_conflict() {
    let mut repo = MockUserRepository::new();
    repo.expect_create()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::conflict("users_username_key")));

    let service = UserAccountService::new(Arc::new(repo));
    let account = NewAccount::try_from_parts("grace", None, "s3cret!").expect("valid account");
    let err = service.sign_up(&account).await.expect_err("duplicate");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[case(UserPersistenceError::connection("down"), ErrorCode::ServiceUnavailable)]
#[case(UserPersistenceError::query("bad sql"), ErrorCode::InternalError)]
#[tokio::test]
async fn current_user_maps_repository_failures(
    #[case] failure: UserPersistenceError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Err(failure));

    let service = UserAccountService::new(Arc::new(repo));
    let err = service
        .current_user(UserId::new(1).expect("id"))
        .await
        .expect_err("repository failure");

    assert_eq!(err.code(), expected);
}

#[tokio::test]
async fn current_user_rejects_stale_sessions() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let service = UserAccountService::new(Arc::new(repo));
    let err = service
        .current_user(UserId::new(1).expect("id"))
        .await
        .expect_err("missing user");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn update_redigests_new_passwords() {
    let mut repo = MockUserRepository::new();
    repo.expect_update()
        .withf(|id, changes| {
            id.get() == 9
                && changes.username.is_none()
                && changes.email == Some(None)
                && changes
                    .password_digest
                    .as_ref()
                    .is_some_and(|digest| digest.verify("n3w-secret"))
        })
        .times(1)
        .return_once(|_, _| Ok(Some(user(9, "grace"))));

    let service = UserAccountService::new(Arc::new(repo));
    let changes =
        AccountChanges::try_from_parts(None, Some(""), Some("n3w-secret")).expect("valid changes");
    let updated = service
        .update_current_user(UserId::new(9).expect("id"), &changes)
        .await
        .expect("update succeeds");

    assert_eq!(updated.id().get(), 9);
}

#[tokio::test]
async fn empty_update_returns_the_current_account() {
    let mut repo = MockUserRepository::new();
    repo.expect_update().never();
    repo.expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(Some(user(3, "ada"))));

    let service = UserAccountService::new(Arc::new(repo));
    let unchanged = service
        .update_current_user(UserId::new(3).expect("id"), &AccountChanges::default())
        .await
        .expect("no-op update");

    assert_eq!(unchanged.username().as_ref(), "ada");
}

#[rstest]
#[case(Err(UserPersistenceError::conflict("users_username_key")), ErrorCode::Conflict)]
#[case(Ok(None), ErrorCode::Unauthorized)]
#[case(Err(UserPersistenceError::connection("down")), ErrorCode::ServiceUnavailable)]
#[tokio::test]
async fn update_maps_repository_outcomes(
    #[case] outcome: Result<Option<User>, UserPersistenceError>,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_update()
        .times(1)
        .return_once(move |_, _| outcome);

    let service = UserAccountService::new(Arc::new(repo));
    let changes = AccountChanges::try_from_parts(Some("ada"), None, None).expect("valid changes");
    let err = service
        .update_current_user(UserId::new(9).expect("id"), &changes)
        .await
        .expect_err("update rejected");

    assert_eq!(err.code(), expected);
}
