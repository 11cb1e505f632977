//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--interactive` / `--no-interactive`: Control prompts
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Lockwork - coordinate Git LFS file locks across collaborators
#[derive(Parser, Debug)]
#[command(name = "lw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if lw was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable interactive prompts
    #[arg(long = "interactive", global = true, conflicts_with = "no_interactive")]
    pub interactive_flag: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Returns true if:
    /// - `--interactive` was explicitly set, OR
    /// - Neither `--no-interactive` nor `--quiet` was set, the configured
    ///   default allows prompts, AND stdin is a TTY
    pub fn interactive(&self, configured: bool) -> bool {
        if self.interactive_flag {
            true
        } else if self.no_interactive || self.quiet || !configured {
            false
        } else {
            std::io::stdin().is_terminal()
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the repository root
    #[command(
        name = "root",
        long_about = "Print the root of the repository containing the working directory.\n\n\
            Works from any subdirectory and from linked worktrees, whose root is the \
            worktree directory itself."
    )]
    Root {
        /// Print only the root directory's name
        #[arg(long)]
        name: bool,
    },

    /// List git remotes
    Remotes,

    /// List lockable files and who holds their locks
    #[command(
        name = "ls",
        long_about = "List every file marked lockable in .gitattributes, together with \
            the lock held on it.\n\n\
            Locks on paths that are no longer lockable (deleted, renamed, or whose \
            attributes changed) are listed as missing so they can be released.\n\n\
            Classification and lock listing run together; if either fails the command \
            fails and reports both.",
        after_help = "\
WORKFLOW EXAMPLES:
    # See everything that can be locked
    lw ls

    # Only files someone is holding
    lw ls --filter locked

    # Stale locks to clean up
    lw ls --filter missing

    # Machine-readable output for scripts
    lw ls --json"
    )]
    Ls {
        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Which entries to show
        #[arg(long, value_enum, default_value_t = LsFilter::All)]
        filter: LsFilter,

        /// Sort order
        #[arg(long, value_enum, default_value_t = LsSort::Path)]
        sort: LsSort,
    },

    /// Lock files
    #[command(
        name = "lock",
        long_about = "Lock one or more files on the lock server.\n\n\
            Paths are relative to the current directory. Each path is attempted \
            independently; the command fails if any lock could not be taken.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Lock a file before editing it
    lw lock art/hero.psd

    # Lock several files at once
    lw lock levels/*.umap"
    )]
    Lock {
        /// Files to lock
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Unlock files
    #[command(
        name = "unlock",
        long_about = "Release locks on one or more files.\n\n\
            Only your own locks can be released unless --force is given. Forcing \
            releases someone else's lock and asks for confirmation first.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Release your lock after pushing
    lw unlock art/hero.psd

    # Break a stale lock held by someone else
    lw unlock --force art/hero.psd

    # Same, without a prompt (scripts)
    lw unlock --force --yes art/hero.psd"
    )]
    Unlock {
        /// Files to unlock
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Release locks held by other users
        #[arg(long)]
        force: bool,

        /// Skip the confirmation prompt for --force
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Show or edit the lock server override in .lfsconfig
    Lfsconfig {
        #[command(subcommand)]
        action: LfsconfigAction,
    },

    /// Show or edit .gitattributes rules
    Attributes {
        #[command(subcommand)]
        action: AttributesAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion for lw commands.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    lw completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    lw completion zsh >> ~/.zshrc

    # Fish
    lw completion fish > ~/.config/fish/completions/lw.fish

    # PowerShell
    lw completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Entries shown by `lw ls`
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsFilter {
    /// Everything
    All,
    /// Files with a lock
    Locked,
    /// Lockable files nobody holds
    Unlocked,
    /// Locks on paths that are no longer lockable
    Missing,
}

/// Sort order for `lw ls`
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsSort {
    /// By path
    Path,
    /// Most recently locked first, unlocked files last
    Locked,
}

/// Lfsconfig subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum LfsconfigAction {
    /// Show the configured lock server
    Show,
    /// Point a remote at a lock server
    Set {
        /// Lock server URL
        #[arg(long)]
        url: String,
        /// Remote name (defaults to the first git remote)
        #[arg(long)]
        remote: Option<String>,
        /// Use basic authentication for this server
        #[arg(long)]
        auth: bool,
    },
    /// Remove the lock server override
    Clear,
}

/// Attributes subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AttributesAction {
    /// List rules
    List,
    /// Add a pattern, or update it if it already exists
    Add {
        /// Pattern, as written in .gitattributes
        pattern: String,
        /// Do not store matching files in LFS
        #[arg(long)]
        no_lfs: bool,
        /// Do not mark matching files lockable
        #[arg(long)]
        no_lockable: bool,
    },
    /// Remove every rule for a pattern
    Remove {
        /// Pattern to remove
        pattern: String,
    },
    /// Append a comment line
    Comment {
        /// Comment text, without the leading '#'
        text: String,
    },
    /// Add the built-in rules for common binary assets
    Defaults {
        /// Discard existing rules instead of appending missing ones
        #[arg(long)]
        replace: bool,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_unlock_flags() {
        let cli = Cli::try_parse_from(["lw", "unlock", "--force", "-y", "a.psd", "b.psd"]).unwrap();
        match cli.command {
            Command::Unlock { paths, force, yes } => {
                assert_eq!(paths.len(), 2);
                assert!(force);
                assert!(yes);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn lock_requires_a_path() {
        assert!(Cli::try_parse_from(["lw", "lock"]).is_err());
    }

    #[test]
    fn quiet_disables_interactive() {
        let cli = Cli::try_parse_from(["lw", "-q", "root"]).unwrap();
        assert!(!cli.interactive(true));
    }

    #[test]
    fn explicit_interactive_wins() {
        let cli = Cli::try_parse_from(["lw", "--interactive", "root"]).unwrap();
        assert!(cli.interactive(false));
    }

    #[test]
    fn configured_default_disables_prompts() {
        let cli = Cli::try_parse_from(["lw", "root"]).unwrap();
        assert!(!cli.interactive(false));
    }

    #[test]
    fn ls_defaults() {
        let cli = Cli::try_parse_from(["lw", "ls"]).unwrap();
        match cli.command {
            Command::Ls { json, filter, sort } => {
                assert!(!json);
                assert_eq!(filter, LsFilter::All);
                assert_eq!(sort, LsSort::Path);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
