//! `slots` CLI: slot grids, month views and bookable dates from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Slot grid for a day (appointments JSON on stdin → slots JSON on stdout)
//! cat appointments.json | slots grid --date 2024-06-10 --barber barber1 --duration 30
//!
//! # Use a configured service's duration and only list free slots
//! slots grid --date 2024-06-10 --service 3 --free-only -i appointments.json
//!
//! # Month view for the dashboard calendar
//! slots calendar --month 2024-06 -i appointments.json
//!
//! # Dates offered on the public booking page
//! slots --config shop.toml dates --from 2024-06-10
//!
//! # Check an appointment snapshot
//! slots validate -i appointments.json
//! ```
//!
//! Logs go to stderr. Set `SLOTS_LOG` (e.g. `SLOTS_LOG=slot_engine=debug`)
//! or pass `--verbose` to see them.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use slot_engine::{
    month_view, parse_appointments, Appointment, OverlapRule, ShopSettings, SlotEngine,
};
use std::io::{self, Read};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "slots", version, about = "Barbershop slot availability CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Shop settings file (TOML); built-in defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the slot grid of one day for one barber
    Grid {
        /// Day to compute (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Barber id (defaults to the first configured barber)
        #[arg(long)]
        barber: Option<String>,
        /// Service duration in minutes
        #[arg(long, allow_hyphen_values = true, conflicts_with = "service")]
        duration: Option<i64>,
        /// Configured service id whose duration to use
        #[arg(long)]
        service: Option<String>,
        /// Appointments JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Override the configured overlap rule
        #[arg(long, value_enum)]
        rule: Option<RuleArg>,
        /// Only print available slots
        #[arg(long)]
        free_only: bool,
    },
    /// Group appointments into a month view
    Calendar {
        /// Month to show (YYYY-MM)
        #[arg(long)]
        month: String,
        /// Only include this barber's appointments
        #[arg(long)]
        barber: Option<String>,
        /// Appointments JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Date to treat as today (defaults to today in the shop timezone)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// List the dates the public booking page offers
    Dates {
        /// Barber id (defaults to the first configured barber)
        #[arg(long)]
        barber: Option<String>,
        /// First date (defaults to today in the shop timezone)
        #[arg(long)]
        from: Option<NaiveDate>,
    },
    /// Validate an appointments JSON snapshot
    Validate {
        /// Appointments JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RuleArg {
    /// Slot start must fall inside an appointment to conflict
    StartWithin,
    /// Slot window must intersect an appointment to conflict
    Interval,
}

impl From<RuleArg> for OverlapRule {
    fn from(rule: RuleArg) -> Self {
        match rule {
            RuleArg::StartWithin => OverlapRule::StartWithin,
            RuleArg::Interval => OverlapRule::Interval,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Grid {
            date,
            barber,
            duration,
            service,
            input,
            rule,
            free_only,
        } => {
            let barber_id = resolve_barber(&settings, barber.as_deref())?;
            let duration = match (duration, service.as_deref()) {
                (Some(minutes), _) => minutes,
                (None, Some(service_id)) => {
                    let service = settings
                        .services_for(&barber_id)
                        .into_iter()
                        .find(|s| s.id == service_id)
                        .with_context(|| {
                            format!("Unknown service for barber {}: {}", barber_id, service_id)
                        })?;
                    i64::from(service.duration)
                }
                (None, None) => i64::from(
                    settings
                        .default_service(&barber_id)
                        .context("No default service for barber")?
                        .duration,
                ),
            };

            let engine = settings.engine_for(&barber_id).context("Unknown barber")?;
            let engine = match rule {
                Some(rule) => SlotEngine::new(*engine.grid(), rule.into()),
                None => engine,
            };

            let appointments = read_appointments(input.as_deref())?;
            let mut slots = engine
                .compute_slots(date, &barber_id, duration, &appointments)
                .context("Failed to compute slots")?;
            if free_only {
                slots.retain(|s| s.available);
            }
            info!(%date, barber_id = %barber_id, duration, slots = slots.len(), "computed grid");
            print_json(&slots)?;
        }
        Commands::Calendar {
            month,
            barber,
            input,
            today,
        } => {
            let (year, month) = parse_month(&month)?;
            let today = match today {
                Some(d) => d,
                None => settings.today().context("Failed to determine today")?,
            };

            let mut appointments = read_appointments(input.as_deref())?;
            if let Some(barber_id) = barber {
                appointments.retain(|a| a.barber_id == barber_id);
            }
            let view = month_view(&appointments, year, month, today)
                .context("Failed to build month view")?;
            print_json(&view)?;
        }
        Commands::Dates { barber, from } => {
            let barber_id = resolve_barber(&settings, barber.as_deref())?;
            let profile = settings.barber(&barber_id).context("Unknown barber")?;
            let from = match from {
                Some(d) => d,
                None => settings.today().context("Failed to determine today")?,
            };

            let dates = slot_engine::bookable_dates(
                from,
                settings.advance_booking_days,
                &profile.working_days,
            );
            print_json(&dates)?;
        }
        Commands::Validate { input } => {
            let appointments = read_appointments(input.as_deref())?;
            println!("{} valid appointments", appointments.len());
        }
    }

    Ok(())
}

/// Install a stderr subscriber. `SLOTS_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("SLOTS_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    // try_init: a subscriber may already be installed (e.g. in tests).
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(verbose)
                .with_line_number(verbose),
        )
        .with(filter)
        .try_init();
}

fn load_settings(path: Option<&str>) -> Result<ShopSettings> {
    match path {
        Some(path) => {
            let settings = ShopSettings::from_file(path)
                .with_context(|| format!("Failed to load settings: {}", path))?;
            debug!(path, barbers = settings.barbers.len(), "loaded settings");
            Ok(settings)
        }
        None => Ok(ShopSettings::default()),
    }
}

fn resolve_barber(settings: &ShopSettings, barber: Option<&str>) -> Result<String> {
    match barber {
        Some(id) => {
            settings
                .barber(id)
                .with_context(|| format!("Unknown barber: {}", id))?;
            Ok(id.to_string())
        }
        None => Ok(settings
            .default_barber()
            .context("No barbers configured")?
            .id
            .clone()),
    }
}

/// Parse `YYYY-MM`.
fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let parsed = raw
        .split_once('-')
        .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)));
    match parsed {
        Some((year, month)) if (1..=12).contains(&month) => Ok((year, month)),
        _ => bail!("Invalid month: '{}' (expected YYYY-MM)", raw),
    }
}

fn read_appointments(path: Option<&str>) -> Result<Vec<Appointment>> {
    let raw = read_input(path)?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let appointments = parse_appointments(&raw).context("Invalid appointments")?;
    debug!(count = appointments.len(), "read appointments");
    Ok(appointments)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
