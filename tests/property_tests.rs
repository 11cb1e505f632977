//! Property-based tests for reconciliation and the config file grammars.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use std::collections::HashSet;

use proptest::prelude::*;

use lockwork::core::attributes::{parse_rules, render_rules, AttributeRule};
use lockwork::core::lfsconfig::{self, LockServerConfig};
use lockwork::core::types::{RepoPath, UtcTimestamp};
use lockwork::engine::reconcile::merge;
use lockwork::registry::LockRecord;

/// Paths drawn from a small pool so classified and locked sets overlap.
fn repo_path() -> impl Strategy<Value = RepoPath> {
    prop::sample::select(vec![
        "a.psd",
        "b.psd",
        "art/c.blend",
        "art/d.fbx",
        "levels/e.umap",
        "f g.wav",
    ])
    .prop_map(|p| RepoPath::new(p).unwrap())
}

fn lock_record() -> impl Strategy<Value = LockRecord> {
    (repo_path(), "[a-z]{1,8}", 0i64..2_000_000_000).prop_map(|(path, owner, secs)| {
        let at = chrono::DateTime::from_timestamp(secs, 0).unwrap();
        LockRecord {
            id: format!("{}-{}", owner, secs),
            path,
            owner,
            locked_at: UtcTimestamp::from_datetime(at),
        }
    })
}

fn pattern_rule() -> impl Strategy<Value = AttributeRule> {
    (
        r#"(\[attr\]|#|!)?[a-z*?/.!#\\"\t \[\]]{1,12}"#,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(pattern, lfs, lockable)| {
            let mut rule = AttributeRule::pattern(pattern);
            rule.set_stored_in_lfs(lfs);
            rule.set_lockable(lockable);
            rule
        })
}

fn rule() -> impl Strategy<Value = AttributeRule> {
    prop_oneof![
        pattern_rule(),
        "[A-Za-z0-9 ]{0,20}".prop_map(|t| AttributeRule::comment(t.trim().to_string())),
    ]
}

proptest! {
    #[test]
    fn merge_counts(
        classified in prop::collection::vec(repo_path(), 0..8),
        locks in prop::collection::vec(lock_record(), 0..8),
    ) {
        let unique: HashSet<RepoPath> = classified.iter().cloned().collect();
        let views = merge(classified.clone(), locks.clone());

        let present = views.iter().filter(|v| !v.is_missing).count();
        prop_assert_eq!(present, unique.len());

        // Every lock the registry reported shows up exactly once.
        let shown = views.iter().filter(|v| v.is_locked()).count();
        prop_assert_eq!(shown, locks.len());

        let orphaned = locks.iter().filter(|l| !unique.contains(&l.path)).count();
        let missing = views.iter().filter(|v| v.is_missing).count();
        prop_assert!(missing >= orphaned);
        prop_assert!(views.iter().filter(|v| v.is_missing).all(|v| v.is_locked()));
    }

    #[test]
    fn merge_counts_with_unique_lock_paths(
        classified in prop::collection::vec(repo_path(), 0..8),
        locks in prop::collection::vec(lock_record(), 0..8),
    ) {
        let mut seen = HashSet::new();
        let locks: Vec<LockRecord> = locks.into_iter().filter(|l| seen.insert(l.path.clone())).collect();
        let unique: HashSet<RepoPath> = classified.iter().cloned().collect();
        let overlap = locks.iter().filter(|l| unique.contains(&l.path)).count();

        let views = merge(classified, locks.clone());
        prop_assert_eq!(views.len(), unique.len() + locks.len() - overlap);
        prop_assert_eq!(views.iter().filter(|v| v.is_missing).count(), locks.len() - overlap);
    }

    #[test]
    fn attribute_rules_round_trip(rules in prop::collection::vec(rule(), 0..10)) {
        let text = render_rules(&rules).unwrap();
        prop_assert_eq!(parse_rules(&text), rules);
    }

    #[test]
    fn lock_server_config_round_trip(
        remote in "[a-z][a-z0-9_-]{0,10}",
        user in prop::option::of("[a-z]{1,6}"),
        host in "[a-zA-Z]{1,10}",
        port in prop::option::of(1024u16..65535),
        path in "(/[a-z0-9]{1,6}){0,3}",
        tail in prop::option::of("/[a-z]{0,4}[#;][a-z#;]{0,6}"),
        auth in any::<bool>(),
    ) {
        let user = user.map(|u| format!("{}@", u)).unwrap_or_default();
        let port = port.map(|p| format!(":{}", p)).unwrap_or_default();
        let url = format!(
            "https://{}{}.example.com{}{}{}",
            user,
            host,
            port,
            path,
            tail.unwrap_or_default()
        );
        let config = LockServerConfig { remote, url, auth };
        let text = lfsconfig::render(&config).unwrap();
        prop_assert_eq!(lfsconfig::parse(&text).unwrap(), Some(config));
    }
}
