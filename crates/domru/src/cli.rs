//! Clap derive structures for the `domru` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// domru -- open intercom doors and watch cameras from the command line
#[derive(Debug, Parser)]
#[command(
    name = "domru",
    version,
    about = "Dom.ru MyHome from the command line: doors, cameras, account",
    long_about = "Command-line client for the Dom.ru (ER-Telecom) MyHome service.\n\n\
        Log in once with your phone number and SMS code; the session is stored\n\
        in the config file and refreshed automatically.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "DOMRU_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// API base URL (overrides config)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DOMRU_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in with phone number and SMS code
    Login(LoginArgs),

    /// Forget the stored session
    Logout,

    /// List regional operators
    Operators,

    /// List your places (addresses)
    Places,

    /// Show the subscriber profile
    Profile,

    /// Show balance and payment state
    Finances,

    /// Doors, gates and barriers
    #[command(alias = "ac")]
    Access(AccessArgs),

    /// Forpost cameras
    #[command(alias = "cam")]
    Cameras(CamerasArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGIN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Phone number, e.g. 79991234567 or "+7 (999) 123-45-67"
    #[arg(long)]
    pub phone: Option<String>,

    /// Account to use when the phone has several contracts (0-based)
    #[arg(long, value_name = "INDEX")]
    pub account: Option<usize>,

    /// SMS code received earlier; skips requesting a new one
    #[arg(long)]
    pub code: Option<u32>,

    /// Do not write the session to the config file
    #[arg(long)]
    pub no_save: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ACCESS CONTROLS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AccessArgs {
    #[command(subcommand)]
    pub command: AccessCommand,
}

#[derive(Debug, Subcommand)]
pub enum AccessCommand {
    /// List access controls across all places
    #[command(alias = "ls")]
    List,

    /// Show one access control
    Show {
        /// Access control ID
        id: u64,
    },

    /// Open a door or gate
    Open {
        /// Access control ID
        id: u64,
    },

    /// Show the camera watching an access control
    Camera {
        /// Access control ID
        id: u64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CAMERAS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CamerasArgs {
    #[command(subcommand)]
    pub command: CamerasCommand,
}

#[derive(Debug, Subcommand)]
pub enum CamerasCommand {
    /// List cameras
    #[command(alias = "ls")]
    List,

    /// Show one camera
    Show {
        /// Camera ID
        id: u64,
    },

    /// Download a snapshot image
    Snapshot {
        /// Camera ID
        id: u64,

        /// Write the image here instead of stdout
        #[arg(long, short = 'f', value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Print the live-stream URL
    Stream {
        /// Camera ID
        id: u64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
