//! Command dispatch: CLI args -> plan of steps -> controller -> output.

pub mod config_cmd;

use std::sync::Arc;

use tracing::debug;
use wifictl_config::{Config, load_config};
use wifictl_core::{Command as CoreCommand, Controller, CoreError, HalHandles, StatusSnapshot};
use wifictl_hal::{Daemon, ScanSettings, SimHal, sim};

use crate::cli::{Command, GlobalOpts, OutputFormat, ScanArgs, SoftapArgs, Step};
use crate::error::CliError;
use crate::output::{self, Outcome, StepReport};

/// One thing to do against the running controller.
#[derive(Debug)]
enum Action {
    Exec(CoreCommand),
    Status,
    Kill(Daemon),
}

/// Dispatch a controller-bound command.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    let mut config = load_config(global.config.as_deref())?;
    apply_simulator_flags(&mut config, global)?;
    let format = output::resolve_format(global.output, &config)?;

    let (steps, scan, as_list) = match cmd {
        Command::StartWifi => (vec![Step::StartWifi], ScanArgs::default(), false),
        Command::StopWifi => (vec![Step::StopWifi], ScanArgs::default(), false),
        Command::StartSoftap(args) => {
            apply_softap_flags(&mut config, args);
            (vec![Step::StartSoftap], ScanArgs::default(), false)
        }
        Command::StopSoftap => (vec![Step::StopSoftap], ScanArgs::default(), false),
        Command::Status => (vec![Step::Status], ScanArgs::default(), false),
        Command::Caps => (vec![Step::Caps], ScanArgs::default(), true),
        Command::Scan(args) => (vec![Step::Scan], args, true),
        Command::Run(args) => (args.steps, ScanArgs::default(), true),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    };

    let plan = plan(&steps, &config, &scan)?;
    debug!(steps = steps.len(), actions = plan.len(), "plan ready");

    let sim = Arc::new(config.simulator_builder(global.fail.iter().map(String::as_str))?.build());
    let outcomes = execute(plan, Arc::clone(&sim), &config).await?;

    output::print_output(&output::render(format, &outcomes, as_list), global.quiet);
    if global.trace {
        output::print_trace(&sim.calls());
    }
    if !global.quiet && format == OutputFormat::Table {
        output::print_summary(&outcomes, output::should_color(global.color));
    }

    match outcomes.iter().find_map(Outcome::failure) {
        Some(report) => Err(CliError::CommandFailed {
            command: report.command,
            status: report.result.status,
            message: report.result.error.clone().unwrap_or_default(),
        }),
        None => Ok(()),
    }
}

// ── Flag overrides ──────────────────────────────────────────────────

fn apply_simulator_flags(config: &mut Config, global: &GlobalOpts) -> Result<(), CliError> {
    if let Err(name) = sim::parse_faults(global.fail.iter().map(String::as_str)) {
        return Err(CliError::Validation {
            field: "--fail".into(),
            reason: format!(
                "unknown HAL operation {name:?}; expected one of: {}",
                sim::op_names().join(", ")
            ),
        });
    }
    if let Some(n) = global.supplicant_ready_after {
        config.simulator.supplicant_ready_after = n;
    }
    if let Some(n) = global.hostapd_ready_after {
        config.simulator.hostapd_ready_after = n;
    }
    Ok(())
}

fn apply_softap_flags(config: &mut Config, args: SoftapArgs) {
    if let Some(ssid) = args.ssid {
        config.softap.ssid = ssid;
    }
    if let Some(country) = args.country {
        config.softap.country_code = country;
    }
    if let Some(channel) = args.channel {
        config.softap.channel = channel;
    }
    if args.hidden {
        config.softap.hidden = true;
    }
}

// ── Planning ────────────────────────────────────────────────────────

/// Expand steps into controller actions. The softap configuration is only
/// validated when a step needs it.
fn plan(steps: &[Step], config: &Config, scan: &ScanArgs) -> Result<Vec<Action>, CliError> {
    let mut actions = Vec::new();

    for step in steps {
        match step {
            Step::Initialize => actions.push(Action::Exec(CoreCommand::Initialize)),
            Step::StartWifi => actions.push(Action::Exec(CoreCommand::StartWifi)),
            Step::StopWifi => actions.push(Action::Exec(CoreCommand::StopWifi)),
            Step::StartSoftap => actions.push(Action::Exec(CoreCommand::StartSoftAp {
                config: Box::new(config.softap_config()?),
            })),
            Step::StopSoftap => actions.push(Action::Exec(CoreCommand::StopSoftAp)),
            Step::StaIface => actions.push(Action::Exec(CoreCommand::GetStaIface)),
            Step::ApIface => actions.push(Action::Exec(CoreCommand::GetApIface)),
            Step::Stations => actions.push(Action::Exec(CoreCommand::GetSoftapStationNumber)),
            Step::Mac => actions.push(Action::Exec(CoreCommand::GetMacAddress)),
            Step::Caps => actions.extend(
                [
                    CoreCommand::GetModuleVersion,
                    CoreCommand::GetCapabilities,
                    CoreCommand::GetStaCapabilities,
                ]
                .into_iter()
                .map(Action::Exec),
            ),
            Step::Scan => {
                actions.push(Action::Exec(CoreCommand::StartSingleScan {
                    settings: ScanSettings {
                        frequencies: scan.frequencies.clone(),
                        hidden_networks: Vec::new(),
                    },
                }));
                actions.push(Action::Exec(CoreCommand::GetScanResults));
                if let Some(band_mask) = scan.band_mask {
                    actions.push(Action::Exec(CoreCommand::GetChannelsForBand { band_mask }));
                }
            }
            Step::Reconnect => actions.push(Action::Exec(CoreCommand::Reconnect)),
            Step::Disconnect => actions.push(Action::Exec(CoreCommand::Disconnect)),
            Step::Status => actions.push(Action::Status),
            Step::KillSupplicant => actions.push(Action::Kill(Daemon::Supplicant)),
            Step::KillHostapd => actions.push(Action::Kill(Daemon::Hostapd)),
        }
    }
    Ok(actions)
}

// ── Execution ───────────────────────────────────────────────────────

/// Run the plan on a fresh controller, stopping after the first failed
/// command.
async fn execute(plan: Vec<Action>, sim: Arc<SimHal>, config: &Config) -> Result<Vec<Outcome>, CliError> {
    let hal = HalHandles::uniform(Arc::clone(&sim));
    let outcomes = Controller::oneshot(hal, config.orchestrator_config()?, |controller| async move {
        let mut outcomes = Vec::new();
        let mut id = 0_u64;
        for action in plan {
            match action {
                Action::Exec(command) => {
                    id += 1;
                    let name = command.name();
                    let result = controller.execute(id, command).await?;
                    let failed = !result.is_success();
                    outcomes.push(Outcome::Command(StepReport {
                        command: name,
                        result,
                    }));
                    if failed {
                        break;
                    }
                }
                Action::Status => outcomes.push(Outcome::Status(current_status(&controller))),
                Action::Kill(daemon) => {
                    let notified = sim.kill(daemon);
                    outcomes.push(Outcome::Killed { daemon, notified });
                }
            }
        }
        Ok::<_, CoreError>(outcomes)
    })
    .await?;
    Ok(outcomes)
}

/// The published snapshot with session states read straight from their
/// watch channels, which a death handler updates synchronously.
fn current_status(controller: &Controller) -> StatusSnapshot {
    let mut snapshot = StatusSnapshot::clone(&controller.snapshot());
    snapshot.supplicant = *controller.session_state(Daemon::Supplicant).borrow();
    snapshot.hostapd = *controller.session_state(Daemon::Hostapd).borrow();
    snapshot
}
