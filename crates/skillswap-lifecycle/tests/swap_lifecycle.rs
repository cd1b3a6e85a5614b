//! End-to-end lifecycle scenarios over an in-memory store

use skillswap_lifecycle::{SwapService, UserDirectory};
use skillswap_persistence::PersistenceService;
use skillswap_types::{
    ErrorKind, ProfileUpdate, RequestDirection, SkillSwapError, SwapRequest, SwapStatus, UserId,
};
use std::sync::Arc;

struct Harness {
    directory: UserDirectory,
    swaps: SwapService,
    alice: UserId,
    bob: UserId,
}

async fn setup() -> Harness {
    let store = Arc::new(PersistenceService::in_memory().await.unwrap());
    let directory = UserDirectory::new(store.clone());
    let swaps = SwapService::new(store.clone(), store.clone(), store);

    let alice = directory
        .register_user("alice", "Alice", "alice@example.com")
        .await
        .unwrap();
    let bob = directory
        .register_user("bob", "Bob", "bob@example.com")
        .await
        .unwrap();

    directory
        .update_profile(
            &alice.id,
            &alice.id,
            ProfileUpdate {
                skills_offered: Some(vec!["Guitar".into()]),
                skills_wanted: Some(vec!["Python".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    directory
        .update_profile(
            &bob.id,
            &bob.id,
            ProfileUpdate {
                skills_offered: Some(vec!["Python".into()]),
                skills_wanted: Some(vec!["Guitar".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    Harness {
        directory,
        swaps,
        alice: alice.id,
        bob: bob.id,
    }
}

async fn propose(h: &Harness) -> SwapRequest {
    h.swaps
        .propose_swap(&h.alice, &h.bob, "Guitar", "Python", Some("Let's trade".into()))
        .await
        .unwrap()
}

async fn completed(h: &Harness) -> SwapRequest {
    let request = propose(h).await;
    h.swaps.accept(&request.id, &h.bob).await.unwrap();
    h.swaps.complete(&request.id, &h.alice).await.unwrap()
}

#[tokio::test]
async fn test_full_lifecycle() {
    let h = setup().await;
    let request = propose(&h).await;
    assert_eq!(request.status, SwapStatus::Pending);

    let pending = h.swaps.pending_incoming(&h.bob).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].direction, RequestDirection::Incoming);
    assert!(pending[0].can_accept);

    let accepted = h.swaps.accept(&request.id, &h.bob).await.unwrap();
    assert_eq!(accepted.status, SwapStatus::Accepted);
    assert!(h.swaps.pending_incoming(&h.bob).await.unwrap().is_empty());

    let sessions = h.swaps.sessions(&h.alice).await.unwrap();
    assert_eq!(sessions.active.len(), 1);
    assert!(sessions.active[0].can_chat);

    let done = h.swaps.complete(&request.id, &h.alice).await.unwrap();
    assert_eq!(done.status, SwapStatus::Completed);

    let sessions = h.swaps.sessions(&h.bob).await.unwrap();
    assert!(sessions.active.is_empty());
    assert_eq!(sessions.completed.len(), 1);
    assert!(sessions.completed[0].can_rate);
}

#[tokio::test]
async fn test_sender_cannot_accept_own_request() {
    let h = setup().await;
    let request = propose(&h).await;

    let err = h.swaps.accept(&request.id, &h.alice).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    let err = h
        .swaps
        .accept(&request.id, &UserId::from("mallory"))
        .await
        .unwrap_err();
    assert!(matches!(err, SkillSwapError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_no_transition_out_of_completed() {
    let h = setup().await;
    let request = completed(&h).await;

    for target in [
        SwapStatus::Pending,
        SwapStatus::Accepted,
        SwapStatus::Rejected,
        SwapStatus::Completed,
    ] {
        for actor in [&h.alice, &h.bob] {
            let err = h
                .swaps
                .transition_swap(&request.id, actor, target)
                .await
                .unwrap_err();
            assert!(
                matches!(err, SkillSwapError::IllegalTransition { .. }),
                "{target}: {err}"
            );
        }
    }
}

#[tokio::test]
async fn test_rejected_is_terminal() {
    let h = setup().await;
    let request = propose(&h).await;
    h.swaps.reject(&request.id, &h.bob).await.unwrap();

    let err = h.swaps.accept(&request.id, &h.bob).await.unwrap_err();
    assert!(matches!(
        err,
        SkillSwapError::IllegalTransition {
            from: SwapStatus::Rejected,
            to: SwapStatus::Accepted
        }
    ));
}

#[tokio::test]
async fn test_invalid_skill_creates_nothing() {
    let h = setup().await;
    let err = h
        .swaps
        .propose_swap(&h.alice, &h.bob, "Cooking", "Python", None)
        .await
        .unwrap_err();
    assert!(matches!(err, SkillSwapError::InvalidSkillSelection(_)));
    assert!(h.swaps.outgoing_requests(&h.alice).await.unwrap().is_empty());
    assert!(h.swaps.incoming_requests(&h.bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rating_applied_once() {
    let h = setup().await;
    let request = completed(&h).await;

    h.swaps
        .submit_rating(&request.id, &h.alice, &h.bob, 5, Some("Patient teacher".into()))
        .await
        .unwrap();
    let err = h
        .swaps
        .submit_rating(&request.id, &h.alice, &h.bob, 4, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SkillSwapError::AlreadyRated { .. }));

    let bob = h.directory.get_user(&h.bob).await.unwrap();
    assert_eq!(bob.reviews, 1);
    assert!((bob.rating - 5.0).abs() < f64::EPSILON);

    let reviews = h.swaps.reviews_for(&h.bob).await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].comment.as_deref(), Some("Patient teacher"));

    let view = h.swaps.sessions(&h.alice).await.unwrap();
    assert!(!view.completed[0].can_rate);

    h.swaps
        .submit_rating(&request.id, &h.bob, &h.alice, 3, None)
        .await
        .unwrap();
    let alice = h.directory.get_user(&h.alice).await.unwrap();
    assert_eq!(alice.reviews, 1);
}

#[tokio::test]
async fn test_rating_rules() {
    let h = setup().await;
    let request = propose(&h).await;

    let err = h
        .swaps
        .submit_rating(&request.id, &h.alice, &h.bob, 5, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SkillSwapError::NotCompleted(_)));

    h.swaps.accept(&request.id, &h.bob).await.unwrap();
    h.swaps.complete(&request.id, &h.bob).await.unwrap();

    let err = h
        .swaps
        .submit_rating(&request.id, &h.alice, &h.bob, 6, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = h
        .swaps
        .submit_rating(&request.id, &h.alice, &h.alice, 5, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SkillSwapError::Unauthorized { .. }));

    let bob = h.directory.get_user(&h.bob).await.unwrap();
    assert_eq!(bob.reviews, 0);
}

#[tokio::test]
async fn test_chat_follows_session_state() {
    let h = setup().await;
    let request = propose(&h).await;

    let err = h
        .swaps
        .post_message(&request.id, &h.alice, "hello")
        .await
        .unwrap_err();
    assert!(matches!(err, SkillSwapError::SessionNotOpen { .. }));

    h.swaps.accept(&request.id, &h.bob).await.unwrap();
    h.swaps
        .post_message(&request.id, &h.alice, "  hello  ")
        .await
        .unwrap();
    h.swaps
        .post_message(&request.id, &h.bob, "hi Alice")
        .await
        .unwrap();

    let err = h
        .swaps
        .post_message(&request.id, &h.bob, "   ")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = h
        .swaps
        .post_message(&request.id, &UserId::from("mallory"), "let me in")
        .await
        .unwrap_err();
    assert!(matches!(err, SkillSwapError::Unauthorized { .. }));

    h.swaps.complete(&request.id, &h.bob).await.unwrap();
    let err = h
        .swaps
        .post_message(&request.id, &h.alice, "one more thing")
        .await
        .unwrap_err();
    assert!(matches!(err, SkillSwapError::SessionNotOpen { .. }));

    let history = h.swaps.messages(&request.id, &h.bob).await.unwrap();
    let texts: Vec<_> = history.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["hello", "hi Alice"]);
    assert_eq!(history[0].author_name, "Alice");

    let err = h
        .swaps
        .messages(&request.id, &UserId::from("mallory"))
        .await
        .unwrap_err();
    assert!(matches!(err, SkillSwapError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_profile_edits_are_owner_only() {
    let h = setup().await;
    let err = h
        .directory
        .update_profile(
            &h.bob,
            &h.alice,
            ProfileUpdate {
                name: Some("Mallory".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SkillSwapError::Unauthorized { .. }));

    let alice = h.directory.get_user(&h.alice).await.unwrap();
    assert_eq!(alice.name, "Alice");
    assert!(alice.is_complete());
}

#[tokio::test]
async fn test_search_excludes_viewer_and_filters() {
    let h = setup().await;
    h.directory
        .register_user("carol", "Carol", "carol@example.com")
        .await
        .unwrap();

    let everyone = h
        .directory
        .search_users(&h.alice, None, None, 1, 10)
        .await
        .unwrap();
    let ids: Vec<_> = everyone.items.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["bob", "carol"]);

    let by_skill = h
        .directory
        .search_users(&h.alice, Some("pyth"), None, 1, 10)
        .await
        .unwrap();
    assert_eq!(by_skill.total, 1);
    assert_eq!(by_skill.items[0].id.as_str(), "bob");

    let exact = h
        .directory
        .search_users(&h.carol(), None, Some("guitar"), 1, 10)
        .await
        .unwrap();
    assert_eq!(exact.total, 2);

    let paged = h
        .directory
        .search_users(&h.carol(), None, None, 2, 1)
        .await
        .unwrap();
    assert_eq!(paged.total_pages, 2);
    assert_eq!(paged.items[0].id.as_str(), "bob");

    let err = h
        .directory
        .search_users(&h.alice, None, None, 0, 10)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

impl Harness {
    fn carol(&self) -> UserId {
        UserId::from("carol")
    }
}

#[tokio::test]
async fn test_duplicate_registration_fails() {
    let h = setup().await;
    let err = h
        .directory
        .register_user("alice", "Alice Again", "a2@example.com")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
