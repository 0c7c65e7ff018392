//! Engine behaviour against an in-memory forge.

mod support;

use roster_core::{Company, RosterConfig, RosterStore};
use roster_forge::ForgeError;
use roster_reconcile::{ReconcileError, Reconciler};

use support::*;

fn reconciler(forge: &FakeForge) -> Reconciler<&FakeForge> {
    Reconciler::new(
        forge,
        RosterConfig::default(),
        RosterStore::new(),
        forge.repositories.clone(),
    )
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

#[test]
fn team_with_another_name_is_fatal() {
    let mut forge = FakeForge::default();
    forge.team.name = "Interns".into();
    let mut engine = reconciler(&forge);

    let err = engine.fetch_core_team().unwrap_err();
    match err {
        ReconcileError::WrongTeam {
            expected, found, ..
        } => {
            assert_eq!(expected, "Developers");
            assert_eq!(found, "Interns");
        }
        other => panic!("expected WrongTeam, got {other:?}"),
    }
}

#[test]
fn team_name_matches_case_insensitively() {
    let mut forge = FakeForge::default()
        .with_member(user("alice", Some("Alice"), None, None))
        .with_member(user("zed", None, None, None));
    forge.team.name = "DEVELOPERS".into();
    let mut engine = reconciler(&forge);

    assert_eq!(engine.fetch_core_team().unwrap(), 2);
    assert!(engine.is_core_member("alice"));
    assert!(!engine.is_core_member("bob"));
}

// ---------------------------------------------------------------------------
// Contributors
// ---------------------------------------------------------------------------

#[test]
fn staff_and_anonymous_contributor() {
    let repo = repository(1, "nuxeo");
    let forge = FakeForge::default()
        .with_repository(repo.clone())
        .with_contributors(1, vec![contributor("alice"), anonymous_contributor("Bob B")])
        .with_member(user("alice", Some("Alice"), Some("alice@nuxeo.com"), Some("Nuxeo")));
    let mut engine = reconciler(&forge);

    engine.fetch_core_team().unwrap();
    engine.ingest_contributors().unwrap();
    let summary = engine.reconcile().unwrap();

    let store = engine.store();
    assert_eq!(store.len(), 2);

    let alice = store.get(store.by_login("alice").unwrap()).unwrap();
    assert_eq!(alice.company(), Some(&Company::Internal));
    assert_eq!(alice.display_name(), Some("Alice"));
    assert_eq!(alice.url(), Some("https://x/alice"));
    assert!(alice.commits().is_empty());

    let bob = store.get(store.by_name("Bob B").unwrap()).unwrap();
    assert!(bob.is_anonymous());
    assert!(bob.commits().contains(&repo.html_url));
    assert_eq!(summary.unresolved, 1);

    // the core team answered for alice
    assert!(forge.user_lookups.borrow().is_empty());
}

#[test]
fn contributor_without_login_or_name_is_skipped() {
    let forge = FakeForge::default()
        .with_repository(repository(1, "nuxeo"))
        .with_contributors(1, vec![Default::default(), contributor("bob")]);
    let mut engine = reconciler(&forge);

    engine.ingest_contributors().unwrap();
    assert_eq!(engine.store().len(), 1);
}

#[test]
fn external_contributor_gets_repository_evidence() {
    let repo = repository(7, "nuxeo-web");
    let forge = FakeForge::default()
        .with_repository(repo.clone())
        .with_contributors(7, vec![contributor("bob")]);
    let mut engine = reconciler(&forge);

    engine.fetch_core_team().unwrap();
    engine.ingest_contributors().unwrap();

    let store = engine.store();
    let bob = store.get(store.by_login("bob").unwrap()).unwrap();
    assert!(bob.commits().contains(&repo.html_url));
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[test]
fn unknown_login_stays_incomplete() {
    let forge = FakeForge::default()
        .with_repository(repository(1, "nuxeo"))
        .with_contributors(1, vec![contributor("dave")]);
    let mut engine = reconciler(&forge);

    engine.fetch_core_team().unwrap();
    engine.ingest_contributors().unwrap();
    let summary = engine.reconcile().unwrap();

    assert_eq!(summary.enriched, 0);
    let store = engine.store();
    let dave = store.get(store.by_login("dave").unwrap()).unwrap();
    assert!(!dave.is_complete());
    assert_eq!(dave.company(), None);
    assert!(!dave.is_signed());
    assert_eq!(forge.user_lookups.borrow().as_slice(), ["dave"]);
}

#[test]
fn profile_lookup_failure_is_fatal() {
    let mut forge = FakeForge::default()
        .with_repository(repository(1, "nuxeo"))
        .with_contributors(1, vec![contributor("eve")]);
    forge.broken_users.insert("eve".into());
    let mut engine = reconciler(&forge);

    engine.ingest_contributors().unwrap();
    let err = engine.reconcile().unwrap_err();
    assert!(matches!(
        err,
        ReconcileError::Forge(ForgeError::Transport { .. })
    ));
}

#[test]
fn profile_fills_gaps_and_absorbs_same_named_orphan() {
    let repo = repository(1, "nuxeo");
    let forge = FakeForge::default()
        .with_repository(repo.clone())
        .with_contributors(
            1,
            vec![contributor("frank"), anonymous_contributor("Frank F")],
        )
        .with_user(user("frank", Some("Frank F"), Some("frank@acme.org"), Some("Acme")));
    let mut engine = reconciler(&forge);

    engine.fetch_core_team().unwrap();
    engine.ingest_contributors().unwrap();
    let summary = engine.reconcile().unwrap();

    assert_eq!(summary.enriched, 1);
    assert_eq!(summary.absorbed_by_name, 1);
    let store = engine.store();
    assert_eq!(store.len(), 1);
    assert!(store.by_name("Frank F").is_none());
    let frank = store.get(store.by_login("frank").unwrap()).unwrap();
    assert_eq!(frank.company(), Some(&Company::External("Acme".into())));
    assert!(frank.emails().contains("frank@acme.org"));
    assert!(frank.aliases().is_empty(), "own display name is never an alias");
}

// ---------------------------------------------------------------------------
// Mining and merging
// ---------------------------------------------------------------------------

#[test]
fn mining_keeps_first_matching_email() {
    let repo = repository(1, "nuxeo");
    let forge = FakeForge::default()
        .with_repository(repo.clone())
        .with_contributors(1, vec![anonymous_contributor("Bob B")])
        .with_commits(
            1,
            vec![
                git_commit(&repo, "aaa", "Bob B", "bob@first.example"),
                git_commit(&repo, "bbb", "Bob B", "bob@second.example"),
            ],
        );
    let mut engine = reconciler(&forge);

    engine.ingest_contributors().unwrap();
    let summary = engine.reconcile().unwrap();

    assert_eq!(summary.mined, 1);
    assert_eq!(summary.unresolved, 0);
    let store = engine.store();
    let bob = store.get(store.by_name("Bob B").unwrap()).unwrap();
    let emails: Vec<&str> = bob.emails().iter().map(String::as_str).collect();
    assert_eq!(emails, ["bob@first.example"]);
}

#[test]
fn mined_staff_email_marks_company_unconfirmed() {
    let repo = repository(1, "nuxeo");
    let forge = FakeForge::default()
        .with_repository(repo.clone())
        .with_contributors(1, vec![contributor("erin")])
        .with_commits(1, vec![git_commit(&repo, "ccc", "erin", "erin@nuxeo.com")]);
    let mut engine = reconciler(&forge);

    engine.ingest_contributors().unwrap();
    engine.reconcile().unwrap();

    let store = engine.store();
    let erin = store.get(store.by_login("erin").unwrap()).unwrap();
    assert!(erin.emails().contains("erin@nuxeo.com"));
    assert_eq!(erin.company(), Some(&Company::Unconfirmed));
}

#[test]
fn orphan_sharing_an_email_merges_into_login_record() {
    let repo = repository(1, "nuxeo");
    let forge = FakeForge::default()
        .with_repository(repo.clone())
        .with_contributors(1, vec![contributor("gina"), anonymous_contributor("G. Gee")])
        .with_user(user("gina", Some("Gina Gee"), Some("gina@x.com"), None))
        .with_commits(1, vec![git_commit(&repo, "ddd", "G. Gee", "gina@x.com")]);
    let mut engine = reconciler(&forge);

    engine.ingest_contributors().unwrap();
    let summary = engine.reconcile().unwrap();

    assert_eq!(summary.merged, 1);
    let store = engine.store();
    assert_eq!(store.len(), 1);
    let gina = store.get(store.by_login("gina").unwrap()).unwrap();
    assert!(gina.aliases().contains("G. Gee"));
    // the absorbed name still resolves for later commit lookups
    assert_eq!(store.find_by_any_name("G. Gee"), store.by_login("gina"));
}

#[test]
fn orphan_named_after_a_login_merges_into_it() {
    let repo = repository(1, "nuxeo");
    let forge = FakeForge::default()
        .with_repository(repo.clone())
        .with_contributors(1, vec![contributor("hank"), anonymous_contributor("hank")])
        .with_user(user("hank", None, Some("hank@corp.com"), None))
        .with_commits(1, vec![git_commit(&repo, "fff", "hank", "hank@home.org")]);
    let mut engine = reconciler(&forge);

    engine.ingest_contributors().unwrap();
    let summary = engine.reconcile().unwrap();

    assert_eq!(summary.merged, 1);
    let store = engine.store();
    assert_eq!(store.len(), 1);
    let hank = store.get(store.by_login("hank").unwrap()).unwrap();
    assert!(hank.emails().contains("hank@corp.com"));
    assert!(hank.emails().contains("hank@home.org"));
}

#[test]
fn commit_listing_failure_counts_as_no_commits() {
    let mut forge = FakeForge::default()
        .with_repository(repository(1, "nuxeo"))
        .with_contributors(
            1,
            vec![anonymous_contributor("Bob B"), anonymous_contributor("Kim K")],
        );
    forge.broken_commit_lists.insert(1);
    let mut engine = reconciler(&forge);

    engine.ingest_contributors().unwrap();
    let summary = engine.reconcile().unwrap();

    assert_eq!(summary.mined, 0);
    assert_eq!(summary.unresolved, 2);
    engine.reconcile().unwrap();
    assert_eq!(forge.commit_list_calls.get(), 1);
}

// ---------------------------------------------------------------------------
// Exhaustive pass
// ---------------------------------------------------------------------------

#[test]
fn case_variant_commit_identities_merge_on_email() {
    let repo = repository(1, "nuxeo");
    let forge = FakeForge::default().with_repository(repo.clone()).with_commits(
        1,
        vec![
            git_commit(&repo, "c01", "Carol", "carol@x.com"),
            git_commit(&repo, "c02", "carol", "carol@x.com"),
        ],
    );
    let mut engine = reconciler(&forge);

    engine.ingest_commits();
    assert_eq!(engine.store().len(), 2);
    let summary = engine.reconcile().unwrap();

    assert_eq!(summary.merged, 1);
    let store = engine.store();
    assert_eq!(store.len(), 1);
    let carol = store.get(store.by_name("Carol").unwrap()).unwrap();
    assert!(carol.aliases().contains("carol"));
    assert!(carol.commits().contains(&format!("{}/commit/c01", repo.html_url)));
    assert!(carol.commits().contains(&format!("{}/commit/c02", repo.html_url)));
}

#[test]
fn linked_accounts_are_recorded_from_commits() {
    let repo = repository(1, "nuxeo");
    let alice = user("alice", Some("Alice"), Some("alice@nuxeo.com"), Some("Nuxeo"));
    let ivan = user("ivan", Some("Ivan"), Some("ivan@ext.com"), Some("Acme"));
    let forge = FakeForge::default()
        .with_repository(repo.clone())
        .with_member(alice.clone())
        .with_commits(
            1,
            vec![
                account_commit(&repo, "a01", alice),
                account_commit(&repo, "a02", ivan),
            ],
        );
    let mut engine = reconciler(&forge);

    engine.fetch_core_team().unwrap();
    engine.ingest_commits();

    let store = engine.store();
    let ivan = store.get(store.by_login("ivan").unwrap()).unwrap();
    assert_eq!(ivan.display_name(), Some("Ivan"));
    assert_eq!(ivan.company(), Some(&Company::External("Acme".into())));
    assert!(ivan.commits().contains(&format!("{}/commit/a02", repo.html_url)));
    assert_eq!(store.find_by_any_name("Ivan"), store.by_login("ivan"));

    let alice = store.get(store.by_login("alice").unwrap()).unwrap();
    assert!(alice.commits().is_empty());
}

#[test]
fn commits_are_listed_once_per_repository() {
    let first = repository(1, "nuxeo");
    let second = repository(2, "nuxeo-web");
    let forge = FakeForge::default()
        .with_repository(first.clone())
        .with_repository(second.clone())
        .with_contributors(1, vec![anonymous_contributor("Bob B")])
        .with_commits(1, vec![git_commit(&first, "e01", "Nobody", "n@x.com")])
        .with_commits(2, vec![git_commit(&second, "e02", "Nobody", "n@x.com")]);
    let mut engine = reconciler(&forge);

    engine.ingest_contributors().unwrap();
    engine.reconcile().unwrap();
    engine.ingest_commits();
    engine.reconcile().unwrap();

    assert_eq!(forge.commit_list_calls.get(), 2);
}
