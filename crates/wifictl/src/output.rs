//! Output formatting: table, JSON, plain.
//!
//! Table uses `tabled`, JSON goes through serde, plain emits one value per
//! line for scripting.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};
use wifictl_config::Config;
use wifictl_core::{InterfaceInfo, StatusSnapshot, WifiResult};
use wifictl_hal::{Daemon, HalCall, ResultCode, ScanResult};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Outcomes ─────────────────────────────────────────────────────────

/// A command result labelled with the command that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub command: &'static str,
    #[serde(flatten)]
    pub result: WifiResult,
}

/// Everything a run can produce, in the order it happened.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Command(StepReport),
    Status(StatusSnapshot),
    Killed { daemon: Daemon, notified: bool },
}

impl Outcome {
    /// The first command that did not succeed.
    pub fn failure(&self) -> Option<&StepReport> {
        match self {
            Self::Command(report) if !report.result.is_success() => Some(report),
            _ => None,
        }
    }
}

// ── Format resolution ────────────────────────────────────────────────

/// `--output` wins, then `defaults.output` from the config.
pub fn resolve_format(flag: Option<OutputFormat>, config: &Config) -> Result<OutputFormat, CliError> {
    if let Some(format) = flag {
        return Ok(format);
    }
    <OutputFormat as clap::ValueEnum>::from_str(&config.defaults.output, true).map_err(|_| {
        CliError::Validation {
            field: "defaults.output".into(),
            reason: format!(
                "{:?} is not one of table, json, plain",
                config.defaults.output
            ),
        }
    })
}

pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatch ──────────────────────────────────────────────────

/// Render outcomes in the chosen format. A lone outcome renders as an
/// object in JSON unless `as_list` is set.
pub fn render(format: OutputFormat, outcomes: &[Outcome], as_list: bool) -> String {
    match format {
        OutputFormat::Table => render_tables(outcomes),
        OutputFormat::Json => match outcomes {
            [single] if !as_list => render_json(single),
            _ => render_json(outcomes),
        },
        OutputFormat::Plain => outcomes
            .iter()
            .flat_map(plain_lines)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// One-line summary on stderr, e.g. `3 steps, all succeeded`.
pub fn print_summary(outcomes: &[Outcome], color: bool) {
    let steps = outcomes.len();
    let line = match outcomes.iter().find_map(Outcome::failure) {
        None => format!("{steps} step(s), all succeeded"),
        Some(report) => format!("{} failed with {}", report.command, report.result.status),
    };
    let failed = outcomes.iter().any(|o| o.failure().is_some());
    if !color {
        eprintln!("{line}");
    } else if failed {
        eprintln!("{}", line.red());
    } else {
        eprintln!("{}", line.green());
    }
}

/// The simulator's call log, one `op(arg)` per line.
pub fn print_trace(calls: &[HalCall]) {
    let mut stderr = io::stderr().lock();
    for (n, call) in calls.iter().enumerate() {
        let _ = match &call.arg {
            Some(arg) => writeln!(stderr, "{:>3}  {}({arg})", n + 1, call.op),
            None => writeln!(stderr, "{:>3}  {}", n + 1, call.op),
        };
    }
}

// ── Table rendering ──────────────────────────────────────────────────

#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Command")]
    command: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

#[derive(Tabled)]
struct IfaceRow {
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Interface")]
    name: String,
    #[tabled(rename = "Registered")]
    registered: String,
    #[tabled(rename = "Session")]
    session: String,
    #[tabled(rename = "Since")]
    since: String,
}

#[derive(Tabled)]
struct ScanRow {
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "BSSID")]
    bssid: String,
    #[tabled(rename = "Freq")]
    frequency: u32,
    #[tabled(rename = "Signal")]
    signal: String,
}

fn render_tables(outcomes: &[Outcome]) -> String {
    let mut blocks = Vec::new();
    let mut rows = Vec::new();

    for outcome in outcomes {
        match outcome {
            Outcome::Command(report) => rows.push(step_row(report)),
            Outcome::Killed { daemon, notified } => rows.push(StepRow {
                id: "-".into(),
                command: format!("KILL_{}", daemon.to_string().to_uppercase()),
                status: "-".into(),
                detail: if *notified {
                    "death handler invoked".into()
                } else {
                    "no death handler registered".into()
                },
            }),
            Outcome::Status(snapshot) => {
                if !rows.is_empty() {
                    blocks.push(render_table(&std::mem::take(&mut rows)));
                }
                blocks.push(render_status(snapshot));
            }
        }
    }
    if !rows.is_empty() {
        blocks.push(render_table(&rows));
    }

    let scans: Vec<&ScanResult> = outcomes
        .iter()
        .filter_map(|o| match o {
            Outcome::Command(report) => report.result.scan_results.as_deref(),
            _ => None,
        })
        .flatten()
        .collect();
    if !scans.is_empty() {
        let rows: Vec<ScanRow> = scans.into_iter().map(scan_row).collect();
        blocks.push(render_table(&rows));
    }

    blocks.join("\n")
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn step_row(report: &StepReport) -> StepRow {
    let result = &report.result;
    let detail = match &result.error {
        Some(message) => message.clone(),
        None => details(result).join(", "),
    };
    StepRow {
        id: result.id.to_string(),
        command: report.command.into(),
        status: status_label(result.status),
        detail,
    }
}

fn render_status(snapshot: &StatusSnapshot) -> String {
    let row = |mode: &str, info: Option<&InterfaceInfo>, session: String| match info {
        Some(info) => IfaceRow {
            mode: mode.into(),
            name: info.name.clone(),
            registered: yes_no(info.registered),
            session,
            since: info.created_at.format("%H:%M:%S%.3f").to_string(),
        },
        None => IfaceRow {
            mode: mode.into(),
            name: "-".into(),
            registered: "-".into(),
            session,
            since: "-".into(),
        },
    };
    let rows = [
        row("sta", snapshot.sta.as_ref(), snapshot.supplicant.to_string()),
        row("ap", snapshot.ap.as_ref(), snapshot.hostapd.to_string()),
    ];
    format!(
        "{}\nsoftap running: {}",
        render_table(&rows),
        yes_no(snapshot.softap_running)
    )
}

fn scan_row(result: &ScanResult) -> ScanRow {
    ScanRow {
        ssid: result.ssid.clone(),
        bssid: result.bssid.clone(),
        frequency: result.frequency,
        signal: format!("{} dBm", result.signal_mbm / 100),
    }
}

fn status_label(status: ResultCode) -> String {
    if status.is_success() {
        "ok".into()
    } else {
        status.to_string()
    }
}

fn yes_no(value: bool) -> String {
    String::from(if value { "yes" } else { "no" })
}

/// Filled output fields as `key=value`.
fn details(result: &WifiResult) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(v) = &result.sta_interface {
        out.push(format!("sta_interface={v}"));
    }
    if let Some(v) = &result.ap_interface {
        out.push(format!("ap_interface={v}"));
    }
    if let Some(v) = &result.mac_address {
        out.push(format!("mac={v}"));
    }
    if let Some(v) = result.capabilities {
        out.push(format!("capabilities={v:#x}"));
    }
    if let Some(v) = result.sta_capabilities {
        out.push(format!("sta_capabilities={v:#x}"));
    }
    if let Some(v) = &result.driver_version {
        out.push(format!("driver={v}"));
    }
    if let Some(v) = &result.firmware_version {
        out.push(format!("firmware={v}"));
    }
    if let Some(v) = &result.debug_level {
        out.push(format!("debug_level={}", v.level));
    }
    if let Some(v) = &result.scan_results {
        out.push(format!("bss={}", v.len()));
    }
    if let Some(v) = &result.channels {
        let list: Vec<String> = v.iter().map(ToString::to_string).collect();
        out.push(format!("channels={}", list.join("/")));
    }
    if let Some(v) = result.num_stations {
        out.push(format!("stations={v}"));
    }
    out
}

// ── Plain rendering ──────────────────────────────────────────────────

fn plain_lines(outcome: &Outcome) -> Vec<String> {
    match outcome {
        Outcome::Command(report) => {
            let result = &report.result;
            if !result.is_success() {
                return vec![result.status.to_string()];
            }
            let values = plain_values(result);
            if values.is_empty() {
                vec![result.status.to_string()]
            } else {
                values
            }
        }
        Outcome::Status(snapshot) => vec![
            plain_iface("sta", snapshot.sta.as_ref(), &snapshot.supplicant.to_string()),
            plain_iface("ap", snapshot.ap.as_ref(), &snapshot.hostapd.to_string()),
        ],
        Outcome::Killed { daemon, .. } => vec![format!("killed {daemon}")],
    }
}

fn plain_values(result: &WifiResult) -> Vec<String> {
    let mut out = Vec::new();
    out.extend(result.sta_interface.clone());
    out.extend(result.ap_interface.clone());
    out.extend(result.mac_address.clone());
    out.extend(result.driver_version.clone());
    out.extend(result.firmware_version.clone());
    out.extend(result.capabilities.map(|v| format!("{v:#x}")));
    out.extend(result.sta_capabilities.map(|v| format!("{v:#x}")));
    out.extend(result.debug_level.map(|v| v.level.to_string()));
    if let Some(results) = &result.scan_results {
        out.extend(results.iter().map(|r| format!("{} {}", r.bssid, r.ssid)));
    }
    if let Some(channels) = &result.channels {
        out.extend(channels.iter().map(ToString::to_string));
    }
    out.extend(result.num_stations.map(|v| v.to_string()));
    out
}

fn plain_iface(mode: &str, info: Option<&InterfaceInfo>, session: &str) -> String {
    let name = info.map_or("-", |i| i.name.as_str());
    format!("{mode} {name} {session}")
}

// ── JSON ─────────────────────────────────────────────────────────────

fn render_json<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}
