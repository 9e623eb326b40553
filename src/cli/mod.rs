//! Command-line interface.

pub mod add;
pub mod compare;
pub mod completions;
pub mod edit;
pub mod forget;
pub mod get;
pub mod group;
pub mod init;
pub mod list;
pub mod output;
pub mod resolve;
pub mod show;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

/// Strongbox - an encrypted credential manager.
#[derive(Parser)]
#[command(
    name = "strongbox",
    about = "An encrypted credential manager",
    version,
    after_help = "Locked tight. 🔒"
)]
pub struct Cli {
    /// Database file
    #[arg(long, global = true, env = "STRONGBOX_DB", value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Keyfile providing additional key material
    #[arg(long, global = true, env = "STRONGBOX_KEYFILE", value_name = "PATH")]
    pub keyfile: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Create a new database
    Init,

    /// List group names
    ListGroups {
        /// Include each group's entries
        #[arg(long)]
        entries: bool,
    },

    /// List the entries of a group
    ListEntries {
        /// Group name pattern
        group: String,
    },

    /// Show matching entries (group/title or title query)
    Get {
        /// Query, e.g. "web/gmail" or "gmail"
        query: String,
        /// Show the password in clear text
        #[arg(long)]
        show_password: bool,
    },

    /// Print a single attribute of one entry (pipe-friendly)
    Show {
        /// Query, e.g. "web/gmail" or "gmail"
        query: String,
        /// Attribute to print
        #[arg(default_value = "password")]
        field: String,
    },

    /// Add a new entry (prompts for anything not supplied)
    Add {
        /// Group name pattern (defaults to the root group)
        #[arg(long)]
        group: Option<String>,
        /// Entry title
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Edit one field of an entry (username, url or notes)
    Edit {
        /// Query, e.g. "web/gmail" or "gmail"
        query: String,
        /// Field to change
        field: String,
        /// New value
        value: String,
    },

    /// Change an entry's password
    ChangePassword {
        /// Query, e.g. "web/gmail" or "gmail"
        query: String,
        /// New password (prompted if not supplied)
        #[arg(long)]
        password: Option<String>,
    },

    /// Remove an entry
    Rm {
        /// Query, e.g. "web/gmail" or "gmail"
        query: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Manage groups
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },

    /// Compare the database against conflicting sibling copies
    Compare,

    /// Drop the cached password
    Forget,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Group subcommands.
#[derive(Subcommand)]
pub enum GroupAction {
    /// Add a group
    Add {
        /// Group name
        name: String,
        /// Parent group pattern (defaults to the root group)
        #[arg(long)]
        parent: Option<String>,
    },

    /// Remove a group and everything in it
    Rm {
        /// Group name pattern
        pattern: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a command.
pub fn execute(cli: Cli) -> Result<()> {
    use Command::*;

    let ctx = resolve::CliContext {
        db: cli.db,
        keyfile: cli.keyfile,
    };

    match cli.command {
        Init => init::execute(&ctx),
        ListGroups { entries } => list::groups(&ctx, entries),
        ListEntries { group } => list::entries(&ctx, &group),
        Get {
            query,
            show_password,
        } => get::execute(&ctx, &query, show_password),
        Show { query, field } => show::execute(&ctx, &query, &field),
        Add {
            group,
            title,
            username,
            password,
            url,
            notes,
        } => add::execute(&ctx, add::AddArgs {
            group,
            title,
            username,
            password,
            url,
            notes,
        }),
        Edit {
            query,
            field,
            value,
        } => edit::edit(&ctx, &query, &field, &value),
        ChangePassword { query, password } => edit::change_password(&ctx, &query, password),
        Rm { query, yes } => edit::rm(&ctx, &query, yes),
        Group { action } => match action {
            GroupAction::Add { name, parent } => group::add(&ctx, &name, parent.as_deref()),
            GroupAction::Rm { pattern, yes } => group::rm(&ctx, &pattern, yes),
        },
        Compare => compare::execute(&ctx),
        Forget => forget::execute(&ctx),
        Completions { shell } => completions::execute(shell),
    }
}
