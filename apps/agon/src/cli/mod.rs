//! # Agon CLI Module
//!
//! This module implements the CLI interface for Agon.
//!
//! ## Available Commands
//!
//! - `serve` - Start the HTTP server
//! - `status` - Show archive status
//! - `init` - Initialize a new database
//! - `enroll` / `agents` - Register and list debate participants
//! - `open` / `debates` - Open and list debate sessions
//! - `argue` / `rebut` / `concede` - Author records
//! - `resolve` / `show` - Short-hash resolution and record display
//! - `chain` - Bounded-depth relationship chain from a root
//! - `audit` - Whole-graph cycle audit
//! - `vote` / `consensus` - Closing votes and consensus status
//! - `remove` - Administrative record deletion

mod commands;

use agon_core::AgonError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Agon - content-addressed debate archive
///
/// Persists immutable argument records under BLAKE3 content hashes and
/// traverses the derived relationship graph between them.
#[derive(Parser, Debug)]
#[command(name = "agon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the archive database (overrides agon.toml)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend: "redb" (persistent) or "memory" (ephemeral)
    #[arg(short = 'B', long, global = true)]
    pub backend: Option<String>,

    /// Path to a configuration file (default: ./agon.toml if present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show archive status
    Status,

    /// Initialize a new empty database
    Init {
        /// Force initialization even if the database exists
        #[arg(short, long)]
        force: bool,
    },

    /// Register a debate participant
    Enroll {
        /// Participant name (doubles as the agent identifier)
        #[arg(short, long)]
        name: String,

        /// Declared stance, free-form
        #[arg(short, long)]
        stance: Option<String>,
    },

    /// List registered participants
    Agents,

    /// Open a new debate session
    Open {
        /// Debate topic
        #[arg(short, long)]
        topic: String,

        /// Comma-separated participant names
        #[arg(short, long)]
        participants: String,
    },

    /// List debate sessions
    Debates,

    /// Submit an argument to a debate
    Argue {
        /// Session hash prefix
        #[arg(short, long)]
        debate: String,

        /// Authoring participant
        #[arg(short, long)]
        author: String,

        /// Argument body
        #[arg(short, long)]
        text: String,

        /// Reasoning mode (deductive, inductive, empirical, analogical)
        #[arg(short, long, default_value = "empirical")]
        kind: String,

        /// Hash prefix of an argument this one supports
        #[arg(long)]
        supports: Option<String>,
    },

    /// Rebut an existing record
    Rebut {
        /// Target hash prefix
        #[arg(short = 'T', long)]
        target: String,

        /// Authoring participant
        #[arg(short, long)]
        author: String,

        /// Rebuttal body
        #[arg(short, long)]
        text: String,

        /// Mode of attack (logical, empirical, contextual)
        #[arg(short, long, default_value = "logical")]
        kind: String,
    },

    /// Concede to an existing record
    Concede {
        /// Target hash prefix
        #[arg(short = 'T', long)]
        target: String,

        /// Authoring participant
        #[arg(short, long)]
        author: String,

        /// Concession body
        #[arg(short, long)]
        text: String,

        /// Degree (full, partial, conditional)
        #[arg(short, long, default_value = "partial")]
        kind: String,
    },

    /// Resolve a hash prefix within a collection
    Resolve {
        /// Collection name (arguments, simulations, agents)
        #[arg(short = 'C', long, default_value = "arguments")]
        collection: String,

        /// Hash prefix (at least 7 hex chars)
        prefix: String,
    },

    /// Show a record by hash prefix
    Show {
        /// Hash prefix
        prefix: String,
    },

    /// Build the relationship chain rooted at a record
    Chain {
        /// Root hash prefix
        prefix: String,

        /// Maximum expansion depth (clamped to the ceiling)
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Audit the whole derived edge set for cycles
    Audit,

    /// Cast a closing vote in a debate
    Vote {
        /// Session hash prefix
        #[arg(short, long)]
        debate: String,

        /// Voting participant
        #[arg(short, long)]
        agent: String,

        /// Vote (yes, no)
        #[arg(short = 'V', long)]
        choice: String,

        /// Optional justification
        #[arg(short, long)]
        reason: Option<String>,
    },

    /// Show consensus status for a debate
    Consensus {
        /// Session hash prefix
        #[arg(short, long)]
        debate: String,

        /// Majority quorum in permille (default rule: unanimity)
        #[arg(short, long)]
        quorum: Option<u16>,

        /// Close the session when the rule is satisfied
        #[arg(long)]
        close: bool,
    },

    /// Administratively remove a record
    Remove {
        /// Collection name (arguments, simulations, agents)
        #[arg(short = 'C', long, default_value = "arguments")]
        collection: String,

        /// Hash prefix
        prefix: String,

        /// Required: records are immutable in normal operation
        #[arg(short, long)]
        force: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AgonError> {
    let config = crate::config::load(cli.config.as_deref())?;
    let database = cli.database.unwrap_or_else(|| config.database());
    let backend = cli.backend.unwrap_or_else(|| config.backend());
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            let host = host.unwrap_or_else(|| config.host());
            let port = port.unwrap_or_else(|| config.port());
            cmd_serve(&database, &backend, &host, port).await
        }
        Some(Commands::Status) => cmd_status(&database, &backend, json_mode),
        Some(Commands::Init { force }) => cmd_init(&database, &backend, force),
        Some(Commands::Enroll { name, stance }) => {
            cmd_enroll(&database, &backend, json_mode, &name, stance)
        }
        Some(Commands::Agents) => cmd_agents(&database, &backend, json_mode),
        Some(Commands::Open {
            topic,
            participants,
        }) => cmd_open(&database, &backend, json_mode, &topic, &participants),
        Some(Commands::Debates) => cmd_debates(&database, &backend, json_mode),
        Some(Commands::Argue {
            debate,
            author,
            text,
            kind,
            supports,
        }) => cmd_argue(
            &database, &backend, json_mode, &debate, &author, &text, &kind, supports,
        ),
        Some(Commands::Rebut {
            target,
            author,
            text,
            kind,
        }) => cmd_rebut(&database, &backend, json_mode, &target, &author, &text, &kind),
        Some(Commands::Concede {
            target,
            author,
            text,
            kind,
        }) => cmd_concede(&database, &backend, json_mode, &target, &author, &text, &kind),
        Some(Commands::Resolve { collection, prefix }) => {
            cmd_resolve(&database, &backend, json_mode, &collection, &prefix)
        }
        Some(Commands::Show { prefix }) => cmd_show(&database, &backend, json_mode, &prefix),
        Some(Commands::Chain { prefix, depth }) => {
            let depth = depth.unwrap_or_else(|| config.default_depth());
            cmd_chain(&database, &backend, json_mode, &prefix, depth)
        }
        Some(Commands::Audit) => cmd_audit(&database, &backend, json_mode),
        Some(Commands::Vote {
            debate,
            agent,
            choice,
            reason,
        }) => cmd_vote(&database, &backend, json_mode, &debate, &agent, &choice, reason),
        Some(Commands::Consensus {
            debate,
            quorum,
            close,
        }) => cmd_consensus(&database, &backend, json_mode, &debate, quorum, close),
        Some(Commands::Remove {
            collection,
            prefix,
            force,
        }) => cmd_remove(&database, &backend, &collection, &prefix, force),
        None => {
            // No subcommand - show status by default
            cmd_status(&database, &backend, json_mode)
        }
    }
}
