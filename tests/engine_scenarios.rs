//! End-to-end engine runs against the in-memory ref store.
//!
//! Each test seeds a `MockRefStore`, feeds the tagger a raw event payload as
//! the runner would deliver it, and checks both the returned result and the
//! refs left behind.

use std::sync::Arc;

use reftagger::core::config::Preferences;
use reftagger::core::event::RawEvent;
use reftagger::core::types::{Namespace, Oid, RefName};
use reftagger::engine::{Tagger, TaggerError};
use reftagger::forge::mock::{FailOn, MockOperation, MockRefStore};
use reftagger::forge::ForgeError;

fn oid(c: char) -> Oid {
    Oid::new(c.to_string().repeat(40)).unwrap()
}

fn prefs(publish_latest: bool) -> Preferences {
    Preferences {
        publish_latest,
        prefer_branch_release: false,
    }
}

fn tagger(store: &MockRefStore, preferences: Preferences) -> Tagger {
    Tagger::new(Arc::new(store.clone()), preferences)
}

fn tag_push(name: &str, commit: char) -> RawEvent {
    let payload = format!(r#"{{"ref":"refs/tags/{name}","created":true}}"#);
    RawEvent::from_payload("push", &payload, oid(commit).as_str()).unwrap()
}

fn tag_delete(name: &str, before: char) -> RawEvent {
    let payload = format!(
        r#"{{"ref":"refs/tags/{name}","deleted":true,"before":"{}","after":"{}"}}"#,
        oid(before),
        "0".repeat(40)
    );
    RawEvent::from_payload("push", &payload, oid('f').as_str()).unwrap()
}

fn branch_delete(name: &str, before: char) -> RawEvent {
    let payload = format!(
        r#"{{"ref":"refs/heads/{name}","deleted":true,"before":"{}","after":"{}"}}"#,
        oid(before),
        "0".repeat(40)
    );
    RawEvent::from_payload("push", &payload, oid('f').as_str()).unwrap()
}

fn release(action: &str, tag: &str, commit: char) -> RawEvent {
    let payload =
        format!(r#"{{"action":"{action}","release":{{"tag_name":"{tag}","prerelease":false}}}}"#);
    RawEvent::from_payload("release", &payload, oid(commit).as_str()).unwrap()
}

mod scenarios {
    use super::*;

    #[tokio::test]
    async fn stale_push_behind_newer_minor_is_rejected() {
        let store = MockRefStore::with_refs([
            ("refs/tags/v3.3.0", oid('b')),
            ("refs/tags/v4.0.0", oid('c')),
        ]);
        let err = tagger(&store, prefs(true))
            .run(&tag_push("v3.2.2", 'e'))
            .await
            .unwrap_err();

        match err {
            TaggerError::StaleRef {
                version,
                major_latest,
            } => {
                assert_eq!(version.to_string(), "3.2.2");
                assert_eq!(major_latest.to_string(), "3.3.0");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(store.mutations().is_empty());
    }

    #[tokio::test]
    async fn first_release_creates_major_and_latest() {
        let store = MockRefStore::new();
        let result = tagger(&store, prefs(true))
            .run(&tag_push("v3.2.0", 'e'))
            .await
            .unwrap();

        assert_eq!(result.major_ref, Some(RefName::major(Namespace::Tags, 3)));
        assert!(result.published_latest);
        assert_eq!(store.ref_target("refs/tags/v3"), Some(oid('e')));
        assert_eq!(store.ref_target("refs/tags/latest"), Some(oid('e')));
    }

    #[tokio::test]
    async fn first_release_without_latest_preference() {
        let store = MockRefStore::new();
        let result = tagger(&store, prefs(false))
            .run(&tag_push("v3.2.0", 'e'))
            .await
            .unwrap();

        assert!(!result.published_latest);
        assert_eq!(store.ref_target("refs/tags/v3"), Some(oid('e')));
        assert_eq!(store.ref_target("refs/tags/latest"), None);
    }

    #[tokio::test]
    async fn deleting_sole_major_unlinks_matching_latest() {
        // v3.0.0 was the newest release; its tag has just been deleted.
        let store = MockRefStore::with_refs([
            ("refs/tags/v2.1.0", oid('a')),
            ("refs/tags/v2", oid('a')),
            ("refs/tags/v3", oid('d')),
            ("refs/tags/latest", oid('d')),
        ]);
        let result = tagger(&store, prefs(true))
            .run(&tag_delete("v3.0.0", 'd'))
            .await
            .unwrap();

        assert_eq!(result.major_ref, None);
        assert!(!result.published_latest);
        assert!(result.unlinked_latest);
        assert_eq!(store.ref_target("refs/tags/latest"), None);
        // No major-ref mutation.
        assert_eq!(store.ref_target("refs/tags/v3"), Some(oid('d')));
        assert_eq!(
            store.mutations(),
            vec![MockOperation::DeleteRef {
                name: "tags/latest".into()
            }]
        );
    }

    #[tokio::test]
    async fn deleting_sole_major_keeps_unrelated_latest() {
        let store = MockRefStore::with_refs([
            ("refs/tags/v5.0.0", oid('a')),
            ("refs/tags/latest", oid('a')),
        ]);
        let result = tagger(&store, prefs(true))
            .run(&tag_delete("v3.0.0", 'd'))
            .await
            .unwrap();

        assert!(!result.unlinked_latest);
        assert_eq!(store.ref_target("refs/tags/latest"), Some(oid('a')));
        assert!(store.mutations().is_empty());
    }

    #[tokio::test]
    async fn edited_release_at_top_updates_major_and_latest() {
        let store = MockRefStore::with_refs([
            ("refs/tags/v2.3.0", oid('e')),
            ("refs/tags/v2.2.0", oid('a')),
            ("refs/tags/v1.9.0", oid('b')),
            ("refs/tags/v2", oid('a')),
            ("refs/tags/latest", oid('a')),
        ]);
        let result = tagger(&store, prefs(true))
            .run(&release("edited", "v2.3.0", 'e'))
            .await
            .unwrap();

        assert_eq!(result.major_ref, Some(RefName::major(Namespace::Tags, 2)));
        assert!(result.published_latest);
        assert_eq!(store.ref_target("refs/tags/v2"), Some(oid('e')));
        assert_eq!(store.ref_target("refs/tags/latest"), Some(oid('e')));
        assert!(store.mutations().iter().all(|op| matches!(
            op,
            MockOperation::UpdateRef { force: true, .. }
        )));
    }
}

mod deletions {
    use super::*;

    #[tokio::test]
    async fn deleting_newest_rolls_major_back() {
        let store = MockRefStore::with_refs([
            ("refs/tags/v3.2.0", oid('b')),
            ("refs/tags/v3", oid('d')),
            ("refs/tags/latest", oid('d')),
        ]);
        let result = tagger(&store, prefs(false))
            .run(&tag_delete("v3.3.0", 'd'))
            .await
            .unwrap();

        assert_eq!(result.major_ref, Some(RefName::major(Namespace::Tags, 3)));
        assert_eq!(result.target.unwrap().name, "v3.2.0");
        assert_eq!(store.ref_target("refs/tags/v3"), Some(oid('b')));
        assert!(result.unlinked_latest);
        assert_eq!(store.ref_target("refs/tags/latest"), None);
    }

    #[tokio::test]
    async fn deleting_newest_republishes_latest() {
        let store = MockRefStore::with_refs([
            ("refs/tags/v3.2.0", oid('b')),
            ("refs/tags/v3", oid('d')),
            ("refs/tags/latest", oid('d')),
        ]);
        let result = tagger(&store, prefs(true))
            .run(&tag_delete("v3.3.0", 'd'))
            .await
            .unwrap();

        assert!(result.published_latest);
        assert!(!result.unlinked_latest);
        assert_eq!(store.ref_target("refs/tags/latest"), Some(oid('b')));
    }

    #[tokio::test]
    async fn deleted_ref_still_listed_keeps_pointers() {
        let store = MockRefStore::with_refs([
            ("refs/tags/v3.3.0", oid('d')),
            ("refs/tags/v3", oid('d')),
            ("refs/tags/latest", oid('d')),
        ]);
        let result = tagger(&store, prefs(true))
            .run(&tag_delete("v3.3.0", 'd'))
            .await
            .unwrap();

        assert_eq!(result.major_ref, Some(RefName::major(Namespace::Tags, 3)));
        assert_eq!(result.target.unwrap().name, "v3.3.0");
        assert!(!result.unlinked_latest);
        assert_eq!(store.ref_target("refs/tags/v3"), Some(oid('d')));
        assert_eq!(store.ref_target("refs/tags/latest"), Some(oid('d')));
        assert!(!store
            .mutations()
            .iter()
            .any(|op| matches!(op, MockOperation::DeleteRef { .. })));
    }

    #[tokio::test]
    async fn branch_deletion_rolls_back_under_branch_releases() {
        let store = MockRefStore::with_refs([
            ("refs/heads/v2.1.0", oid('a')),
            ("refs/heads/v2", oid('b')),
            ("refs/heads/latest", oid('b')),
            ("refs/tags/latest", oid('b')),
        ]);
        let preferences = Preferences {
            publish_latest: false,
            prefer_branch_release: true,
        };
        let result = tagger(&store, preferences)
            .run(&branch_delete("v2.2.0", 'b'))
            .await
            .unwrap();

        assert_eq!(result.major_ref, Some(RefName::major(Namespace::Heads, 2)));
        assert!(result.unlinked_latest);
        assert_eq!(store.ref_target("refs/heads/v2"), Some(oid('a')));
        assert_eq!(store.ref_target("refs/heads/latest"), None);
        // The tag namespace is not the active one.
        assert_eq!(store.ref_target("refs/tags/latest"), Some(oid('b')));
    }

    #[tokio::test]
    async fn deleting_older_version_is_stale() {
        let store = MockRefStore::with_refs([("refs/tags/v3.3.0", oid('b'))]);
        let err = tagger(&store, prefs(true))
            .run(&tag_delete("v3.1.0", 'd'))
            .await
            .unwrap_err();
        assert!(matches!(err, TaggerError::StaleRef { .. }));
        assert!(store.mutations().is_empty());
    }
}

mod validation {
    use super::*;

    #[tokio::test]
    async fn malformed_version_fails_before_any_store_call() {
        let store = MockRefStore::with_refs([("refs/tags/v1.0.0", oid('a'))]);
        let err = tagger(&store, prefs(true))
            .run(&tag_push("v1.0.0.alpha", 'e'))
            .await
            .unwrap_err();
        assert!(matches!(err, TaggerError::Semver { .. }));
        assert_eq!(err.code(), Some("ACTION_SEMVER_ERROR"));
        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn prerelease_release_is_context_error() {
        let store = MockRefStore::new();
        let payload =
            r#"{"action":"published","release":{"tag_name":"v2.0.0-beta.1","prerelease":true}}"#;
        let raw = RawEvent::from_payload("release", payload, oid('e').as_str()).unwrap();
        let err = tagger(&store, prefs(true)).run(&raw).await.unwrap_err();
        assert!(matches!(err, TaggerError::Context));
        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn release_without_tag_is_semver_error() {
        let store = MockRefStore::new();
        let payload = r#"{"action":"published","release":{"prerelease":false}}"#;
        let raw = RawEvent::from_payload("release", payload, oid('e').as_str()).unwrap();
        let err = tagger(&store, prefs(true)).run(&raw).await.unwrap_err();
        match err {
            TaggerError::Semver { raw } => assert_eq!(raw, ""),
            other => panic!("unexpected {other:?}"),
        }
        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn malformed_deletion_commit_is_rejected_up_front() {
        let payload = r#"{"ref":"refs/tags/v1.0.0","deleted":true,"before":"garbage"}"#;
        assert!(RawEvent::from_payload("push", payload, oid('f').as_str()).is_err());
    }

    #[tokio::test]
    async fn unrelated_event_is_context_error() {
        let store = MockRefStore::new();
        let raw = RawEvent::from_payload("pull_request", "{}", oid('e').as_str()).unwrap();
        let err = tagger(&store, prefs(true)).run(&raw).await.unwrap_err();
        assert_eq!(err.code(), Some("ACTION_CONTEXT_ERROR"));
    }
}

mod properties {
    use super::*;

    #[tokio::test]
    async fn rerunning_converges() {
        let store = MockRefStore::with_refs([("refs/tags/v1.0.0", oid('a'))]);
        let t = tagger(&store, prefs(true));
        let event = release("published", "v1.1.0", 'e');

        let first = t.run(&event).await.unwrap();
        let after_first = store.refs();
        let second = t.run(&event).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.refs(), after_first);
    }

    #[tokio::test]
    async fn scan_walks_all_pages() {
        let mut refs: Vec<(String, Oid)> = (0..250)
            .map(|i| (format!("refs/tags/v1.{i}.0"), oid('a')))
            .collect();
        refs.push(("refs/tags/1.999.0".into(), oid('b')));
        let store = MockRefStore::with_refs(refs);

        // Without the `v` prefix the newest ref sorts last in the descending
        // walk, so stopping after one page would miss it.
        let err = tagger(&store, prefs(false))
            .run(&tag_push("v1.500.0", 'e'))
            .await
            .unwrap_err();
        assert!(matches!(err, TaggerError::StaleRef { .. }));

        let pages = store
            .operations()
            .iter()
            .filter(|op| matches!(op, MockOperation::PagedRefs { .. }))
            .count();
        assert_eq!(pages, 3);
    }

    #[tokio::test]
    async fn write_failure_propagates_without_claiming_success() {
        let store = MockRefStore::new().fail_on(FailOn::CreateRef(ForgeError::ApiError {
            status: 500,
            message: "boom".into(),
        }));
        let err = tagger(&store, prefs(true))
            .run(&tag_push("v1.0.0", 'e'))
            .await
            .unwrap_err();
        assert!(!err.is_validation());
        assert!(store.refs().is_empty());
    }

    #[tokio::test]
    async fn latest_failure_keeps_major_update() {
        let store = MockRefStore::with_refs([("refs/tags/v1", oid('a'))])
            .fail_on(FailOn::CreateRef(ForgeError::RateLimited));
        let err = tagger(&store, prefs(true))
            .run(&tag_push("v1.1.0", 'e'))
            .await
            .unwrap_err();

        assert!(matches!(err, TaggerError::Forge(ForgeError::RateLimited)));
        // The major ref update went through before `latest` failed.
        assert_eq!(store.ref_target("refs/tags/v1"), Some(oid('e')));
    }
}
