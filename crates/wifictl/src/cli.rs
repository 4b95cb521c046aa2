//! Clap derive structures for the `wifictl` CLI.
//!
//! Every invocation builds a fresh simulated HAL, starts one controller on
//! it, runs the requested steps in order and shuts the controller down.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "wifictl",
    version,
    about = "Drive Wi-Fi station and hotspot bring-up against a simulated HAL",
    long_about = "Runs the wifictl orchestrator (readiness polling, interface lifecycle,\n\
        supplicant and hostapd sessions) on an in-memory HAL. Faults and\n\
        readiness delays can be injected to exercise failure paths.",
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
    /// Config file (defaults to the platform config dir)
    #[arg(long, short = 'c', env = "WIFICTL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (overrides `defaults.output`)
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Make a simulated HAL operation fail (repeatable, e.g. setup-client-iface)
    #[arg(long, value_name = "HAL_OP", global = true)]
    pub fail: Vec<String>,

    /// Readiness checks until the supplicant reports ready (0 = never)
    #[arg(long, value_name = "N", global = true)]
    pub supplicant_ready_after: Option<u32>,

    /// Readiness checks until hostapd reports ready (0 = never)
    #[arg(long, value_name = "N", global = true)]
    pub hostapd_ready_after: Option<u32>,

    /// Print the recorded HAL calls to stderr when done
    #[arg(long, global = true)]
    pub trace: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Enable station mode and print the interface name
    #[command(alias = "up")]
    StartWifi,

    /// Disable station mode (a no-op when nothing is active)
    #[command(alias = "down")]
    StopWifi,

    /// Bring up an access point from `[softap]` plus overrides
    #[command(alias = "ap")]
    StartSoftap(SoftapArgs),

    /// Tear the access point down
    StopSoftap,

    /// Show interfaces and daemon session states
    #[command(alias = "st")]
    Status,

    /// Show driver versions and capability bitmasks
    Caps,

    /// Run a single scan and list the results
    Scan(ScanArgs),

    /// Run several steps in order against one controller
    Run(RunArgs),

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct SoftapArgs {
    /// Network name
    #[arg(long)]
    pub ssid: Option<String>,

    /// Regulatory domain (two letters)
    #[arg(long)]
    pub country: Option<String>,

    /// Channel, 0 lets the driver choose
    #[arg(long)]
    pub channel: Option<u32>,

    /// Do not broadcast the SSID
    #[arg(long)]
    pub hidden: bool,
}

#[derive(Debug, Default, Args)]
pub struct ScanArgs {
    /// Restrict the scan to these frequencies (MHz)
    #[arg(long = "freq", value_name = "MHZ")]
    pub frequencies: Vec<u32>,

    /// Also list the channels of a band mask (1 = 2.4 GHz, 2 = 5 GHz)
    #[arg(long, value_name = "MASK")]
    pub band_mask: Option<u32>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Steps to run; the run stops at the first failing step
    #[arg(required = true, value_name = "STEP")]
    pub steps: Vec<Step>,
}

/// One unit of work inside `wifictl run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Step {
    Initialize,
    StartWifi,
    StopWifi,
    StartSoftap,
    StopSoftap,
    StaIface,
    ApIface,
    Stations,
    Mac,
    Caps,
    Scan,
    Reconnect,
    Disconnect,
    /// Print the status snapshot
    Status,
    /// Kill the simulated supplicant daemon
    KillSupplicant,
    /// Kill the simulated hostapd daemon
    KillHostapd,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
