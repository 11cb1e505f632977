//! attributes command - Show or edit .gitattributes rules

use super::{verbosity, working_dir};
use crate::cli::args::AttributesAction;
use crate::core::attributes::{default_rules, AttributeRule};
use crate::engine::{Context, LockEngine};
use crate::ui::output;
use anyhow::{bail, Result};

/// Run an attributes subcommand.
pub fn attributes(ctx: &Context, action: AttributesAction) -> Result<()> {
    let cwd = working_dir(ctx)?;
    let engine = LockEngine::from_config(&ctx.config);
    let mut rules = engine.read_attribute_rules(&cwd)?;

    let message = match action {
        AttributesAction::List => {
            for rule in &rules {
                match rule.render() {
                    Ok(line) => println!("{}", line),
                    Err(e) => output::warn(e, verbosity(ctx)),
                }
            }
            return Ok(());
        }
        AttributesAction::Add {
            pattern,
            no_lfs,
            no_lockable,
        } => {
            let updated = upsert(&mut rules, &pattern, !no_lfs, !no_lockable);
            if updated {
                format!("Updated '{}'", pattern)
            } else {
                format!("Added '{}'", pattern)
            }
        }
        AttributesAction::Remove { pattern } => {
            let removed = remove_pattern(&mut rules, &pattern);
            if removed == 0 {
                bail!("No rule for pattern '{}'", pattern);
            }
            format!("Removed {} rule(s) for '{}'", removed, pattern)
        }
        AttributesAction::Comment { text } => {
            rules.push(AttributeRule::comment(text));
            "Added comment".to_string()
        }
        AttributesAction::Defaults { replace } => {
            let added = apply_defaults(&mut rules, replace);
            format!("Added {} default rule(s)", added)
        }
    };

    engine.write_attribute_rules(&cwd, &rules)?;
    output::success(message, verbosity(ctx));
    Ok(())
}

/// Set LFS storage and lockability on every rule for `pattern`, appending
/// a new rule when none exists. Returns whether an existing rule changed.
fn upsert(rules: &mut Vec<AttributeRule>, pattern: &str, lfs: bool, lockable: bool) -> bool {
    let mut found = false;
    for rule in rules
        .iter_mut()
        .filter(|r| r.pattern_str() == Some(pattern))
    {
        rule.set_stored_in_lfs(lfs);
        rule.set_lockable(lockable);
        found = true;
    }

    if !found {
        let mut rule = AttributeRule::pattern(pattern);
        rule.set_stored_in_lfs(lfs);
        rule.set_lockable(lockable);
        rules.push(rule);
    }
    found
}

fn remove_pattern(rules: &mut Vec<AttributeRule>, pattern: &str) -> usize {
    let before = rules.len();
    rules.retain(|r| r.pattern_str() != Some(pattern));
    before - rules.len()
}

/// Add the built-in rules. Without `replace`, patterns already present are
/// left alone and a group's comment is only added with its first new rule.
/// Returns the number of pattern rules added.
fn apply_defaults(rules: &mut Vec<AttributeRule>, replace: bool) -> usize {
    if replace {
        rules.clear();
    }

    let mut added = 0;
    let mut pending_comment = None;
    for rule in default_rules() {
        match rule.pattern_str() {
            None => pending_comment = Some(rule),
            Some(pattern) => {
                if rules.iter().any(|r| r.pattern_str() == Some(pattern)) {
                    continue;
                }
                if let Some(comment) = pending_comment.take() {
                    rules.push(comment);
                }
                rules.push(rule);
                added += 1;
            }
        }
    }
    added
}
