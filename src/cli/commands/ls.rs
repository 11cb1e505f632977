//! ls command - List lockable files with their locks
//!
//! The engine returns every view; filtering and ordering happen here.

use std::cmp::Reverse;

use super::{verbosity, working_dir};
use crate::cli::args::{LsFilter, LsSort};
use crate::engine::{Context, FileLockView, LockEngine};
use crate::ui::output;
use anyhow::{Context as _, Result};

/// List lockable files and orphaned locks.
pub fn ls(ctx: &Context, json: bool, filter: LsFilter, sort: LsSort) -> Result<()> {
    let cwd = working_dir(ctx)?;
    let engine = LockEngine::from_config(&ctx.config);

    let rt = tokio::runtime::Runtime::new()?;
    let views = rt.block_on(engine.list_lockable_files(&cwd))?;
    let views = select(views, filter, sort);

    if json {
        let text = serde_json::to_string_pretty(&views).context("Failed to encode listing")?;
        println!("{}", text);
        return Ok(());
    }

    if views.is_empty() {
        output::print("No lockable files.", verbosity(ctx));
        return Ok(());
    }
    println!("{}", output::format_lock_table(&views));
    Ok(())
}

/// Apply the filter, then a stable sort.
fn select(mut views: Vec<FileLockView>, filter: LsFilter, sort: LsSort) -> Vec<FileLockView> {
    views.retain(|v| match filter {
        LsFilter::All => true,
        LsFilter::Locked => v.is_locked(),
        LsFilter::Unlocked => !v.is_locked(),
        LsFilter::Missing => v.is_missing,
    });

    match sort {
        LsSort::Path => views.sort_by(|a, b| a.path.cmp(&b.path)),
        // Newest lock first; unlocked entries (None) sort last.
        LsSort::Locked => views.sort_by_key(|v| (Reverse(v.locked_at()), v.path.clone())),
    }
    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{RepoPath, UtcTimestamp};
    use crate::engine::reconcile::merge;
    use crate::registry::LockRecord;

    fn lock(p: &str, at: &str) -> LockRecord {
        LockRecord {
            id: p.into(),
            path: RepoPath::new(p).unwrap(),
            owner: "alice".into(),
            locked_at: UtcTimestamp::parse(at).unwrap(),
        }
    }

    fn sample() -> Vec<FileLockView> {
        merge(
            vec![
                RepoPath::new("c.psd").unwrap(),
                RepoPath::new("a.psd").unwrap(),
                RepoPath::new("b.psd").unwrap(),
            ],
            vec![
                lock("a.psd", "2021-01-01T00:00:00Z"),
                lock("z.psd", "2022-01-01T00:00:00Z"),
            ],
        )
    }

    fn paths(views: &[FileLockView]) -> Vec<&str> {
        views.iter().map(|v| v.path.as_str()).collect()
    }

    #[test]
    fn sorts_by_path() {
        let views = select(sample(), LsFilter::All, LsSort::Path);
        assert_eq!(paths(&views), vec!["a.psd", "b.psd", "c.psd", "z.psd"]);
    }

    #[test]
    fn sorts_newest_lock_first() {
        let views = select(sample(), LsFilter::All, LsSort::Locked);
        assert_eq!(paths(&views), vec!["z.psd", "a.psd", "b.psd", "c.psd"]);
    }

    #[test]
    fn filters() {
        let locked = select(sample(), LsFilter::Locked, LsSort::Path);
        assert_eq!(paths(&locked), vec!["a.psd", "z.psd"]);

        let unlocked = select(sample(), LsFilter::Unlocked, LsSort::Path);
        assert_eq!(paths(&unlocked), vec!["b.psd", "c.psd"]);

        let missing = select(sample(), LsFilter::Missing, LsSort::Path);
        assert_eq!(paths(&missing), vec!["z.psd"]);
    }
}
