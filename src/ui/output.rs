//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, commands print JSON themselves and skip
//! these helpers.

use std::fmt::Display;

use crate::engine::FileLockView;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a success message (respects quiet mode).
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Format lock views as an aligned table.
///
/// Columns are path, owner, lock time and a `missing` marker for locks on
/// paths that are no longer lockable.
pub fn format_lock_table(views: &[FileLockView]) -> String {
    let rows: Vec<[String; 4]> = views
        .iter()
        .map(|v| {
            [
                v.path.to_string(),
                v.owner().unwrap_or("-").to_string(),
                v.locked_at()
                    .map(|t| t.as_datetime().format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string()),
                if v.is_missing { "missing" } else { "" }.to_string(),
            ]
        })
        .collect();

    let mut widths = [0usize; 3];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    rows.iter()
        .map(|[path, owner, at, status]| {
            let line = format!(
                "{:<pw$}  {:<ow$}  {:<aw$}  {}",
                path,
                owner,
                at,
                status,
                pw = widths[0],
                ow = widths[1],
                aw = widths[2],
            );
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{RepoPath, UtcTimestamp};
    use crate::engine::reconcile::merge;
    use crate::registry::LockRecord;

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn table_aligns_columns() {
        let views = merge(
            vec![
                RepoPath::new("art/hero.psd").unwrap(),
                RepoPath::new("a.png").unwrap(),
            ],
            vec![
                LockRecord {
                    id: "1".into(),
                    path: RepoPath::new("a.png").unwrap(),
                    owner: "alice".into(),
                    locked_at: UtcTimestamp::parse("2021-03-04T05:06:00Z").unwrap(),
                },
                LockRecord {
                    id: "2".into(),
                    path: RepoPath::new("gone.psd").unwrap(),
                    owner: "bob".into(),
                    locked_at: UtcTimestamp::parse("2021-03-04T05:06:00Z").unwrap(),
                },
            ],
        );

        let table = format_lock_table(&views);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "art/hero.psd  -      -");
        assert_eq!(lines[1], "a.png         alice  2021-03-04 05:06");
        assert_eq!(lines[2], "gone.psd      bob    2021-03-04 05:06  missing");
    }
}
