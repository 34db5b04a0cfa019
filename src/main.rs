// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `cloud-health` - terminal frontend for the Cloud Health backend.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use cloud_health::auth::{AwsCredentials, SessionManager};
use cloud_health::dashboard::{metric_cards, render_text, CycleOutcome, DashboardAggregator, DashboardState};
use cloud_health::error::{ApiError, ApiResult, Envelope, ErrorCode};
use cloud_health::logging::{self, LogFormat};
use cloud_health::models::{CostQuery, DateRange, FindingsFilter, Granularity};
use cloud_health::settings::LocalSettings;
use cloud_health::storage::{KeyValueStore, RedbStore};
use cloud_health::{ClientConfig, CloudHealthClient};

const DEFAULT_RANGE_DAYS: u32 = 30;

#[derive(Parser)]
#[command(name = "cloud-health")]
#[command(about = "AWS monitoring dashboard in the terminal", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print machine-readable `{success, data | error}` JSON
    #[arg(long, global = true)]
    json: bool,

    /// Backend base URL, including `/api/v1`
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Debug logging for this crate
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Exchange AWS credentials for a session
    Login {
        #[arg(long, env = "AWS_ACCESS_KEY_ID")]
        access_key: String,

        #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
        secret_key: String,

        #[arg(long, env = "AWS_REGION")]
        region: Option<String>,
    },

    /// End the session
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Overview of instances, cost, alerts and service health
    Dashboard {
        /// Keep refreshing until Ctrl-C
        #[arg(short, long)]
        watch: bool,

        /// Refresh interval in seconds (watch mode)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// EC2 instances
    Ec2 {
        #[command(subcommand)]
        command: Ec2Command,
    },

    /// S3 buckets
    S3 {
        #[command(subcommand)]
        command: S3Command,
    },

    /// GuardDuty findings
    Guardduty {
        #[command(subcommand)]
        command: GuardDutyCommand,
    },

    /// Cost Explorer
    Costs {
        #[command(subcommand)]
        command: CostsCommand,
    },

    /// Architecture health and recommendations
    Architecture {
        #[command(subcommand)]
        command: ArchitectureCommand,
    },

    /// Dashboard settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

#[derive(Subcommand)]
enum Ec2Command {
    /// List instances
    Instances {
        /// Bypass the backend cache
        #[arg(long)]
        force: bool,
    },
    /// Instance counts by state and type
    Summary,
    /// One instance
    Instance { id: String },
    /// CloudWatch metrics for one instance
    Metrics {
        id: String,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Estimated monthly cost
    CostEstimate,
    /// Available regions
    Regions,
}

#[derive(Subcommand)]
enum S3Command {
    /// List buckets
    Buckets {
        #[arg(long)]
        force: bool,
    },
    /// One bucket
    Bucket { name: String },
    /// Size and object metrics for one bucket
    Metrics { name: String },
    /// Totals across buckets
    Summary,
}

#[derive(Subcommand)]
enum GuardDutyCommand {
    /// List findings
    Findings {
        /// low, medium, high or critical
        #[arg(long)]
        severity: Option<String>,

        /// Only findings from the last N days
        #[arg(long)]
        days: Option<u32>,

        #[arg(long)]
        force: bool,
    },
    /// One finding
    Finding { id: String },
    /// Counts by severity
    Summary,
    /// Configured detectors
    Detectors,
}

#[derive(Subcommand)]
enum CostsCommand {
    /// Cost and usage over a date range
    Usage {
        #[command(flatten)]
        range: RangeArgs,

        /// DAILY, MONTHLY or HOURLY
        #[arg(long, default_value = "DAILY")]
        granularity: String,
    },
    /// Cost grouped by service
    ByService {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Forecast for a future date range
    Forecast {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Current period summary
    Summary,
}

#[derive(Subcommand)]
enum ArchitectureCommand {
    Health,
    Recommendations,
    /// Run a new analysis
    Analyze,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print the current settings
    Show {
        /// Read the backend copy instead of the local one
        #[arg(long)]
        remote: bool,
    },
    /// Set the dashboard refresh interval
    SetRefresh {
        secs: u64,

        /// Also push the change to the backend
        #[arg(long)]
        remote: bool,
    },
    /// Restore defaults
    Reset {
        #[arg(long)]
        remote: bool,
    },
}

#[derive(Args, Clone, Copy)]
struct RangeArgs {
    /// First day, YYYY-MM-DD
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day, YYYY-MM-DD (default today)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Length of the range when --start is omitted
    #[arg(long, default_value_t = DEFAULT_RANGE_DAYS)]
    days: u32,
}

impl RangeArgs {
    fn resolve(&self) -> ApiResult<DateRange> {
        let end = self.end.unwrap_or_else(|| Utc::now().date_naive());
        match self.start {
            Some(start) => DateRange::new(start, end)
                .ok_or_else(|| ApiError::validation("--start must not be after --end")),
            None => DateRange::trailing_days(end, self.days).ok_or_else(|| {
                ApiError::validation(format!("--days {} reaches past the calendar", self.days))
            }),
        }
    }

    /// Explicit range, or `None` to let the backend choose.
    fn resolve_optional(&self) -> ApiResult<Option<DateRange>> {
        if self.start.is_none() && self.end.is_none() {
            return Ok(None);
        }
        self.resolve().map(Some)
    }
}

/// Command result: JSON payload plus its terminal rendering.
struct Report {
    data: Value,
    text: String,
}

impl Report {
    fn json<T: Serialize>(value: &T) -> ApiResult<Self> {
        let data = serde_json::to_value(value)
            .map_err(|e| ApiError::new(ErrorCode::InvalidResponse, e.to_string()))?;
        let text = serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string());
        Ok(Self { data, text })
    }

    fn message(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            data: json!({ "message": text }),
            text,
        }
    }
}

/// Everything a command needs, opened once per invocation.
struct Context {
    config: ClientConfig,
    session: SessionManager,
    client: Arc<CloudHealthClient>,
    settings: LocalSettings,
}

impl Context {
    fn open(api_url: Option<&str>) -> ApiResult<Self> {
        let mut config = ClientConfig::from_env()?;
        if let Some(url) = api_url {
            config = config.with_api_base_url(url)?;
        }

        let store: Arc<dyn KeyValueStore> = Arc::new(RedbStore::open(&config.store_path())?);
        let session = SessionManager::restore(store.clone());
        let client = Arc::new(CloudHealthClient::new(&config, session.clone())?);
        debug!(
            api_url = %config.api_base_url,
            store = %config.store_path().display(),
            authenticated = session.is_authenticated(),
            "Client context ready"
        );

        Ok(Self {
            config,
            session,
            client,
            settings: LocalSettings::new(store),
        })
    }

    fn require_login(&self) -> ApiResult<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(ApiError::new(
                ErrorCode::SessionExpired,
                "Not logged in. Run `cloud-health login` first.",
            ))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(LogFormat::from_env(), cli.verbose);

    let json = cli.json;
    let result = match Context::open(cli.api_url.as_deref()) {
        Ok(ctx) => execute(&ctx, cli.command, json).await,
        Err(err) => Err(err),
    };

    let failed = result.is_err();
    emit(result, json);
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn emit(result: ApiResult<Report>, json: bool) {
    if json {
        let envelope = Envelope::from(result.map(|report| report.data));
        match serde_json::to_string(&envelope) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("error: {e}"),
        }
        return;
    }

    match result {
        Ok(report) => println!("{}", report.text.trim_end()),
        Err(err) => eprintln!("error[{}]: {}", err.code, err.message),
    }
}

async fn execute(ctx: &Context, command: Commands, json: bool) -> ApiResult<Report> {
    let client = &ctx.client;

    match command {
        Commands::Login {
            access_key,
            secret_key,
            region,
        } => {
            let credentials = AwsCredentials::new(access_key, secret_key, region);
            let session = client.login(&credentials).await?;
            info!(account_id = %session.account_id, "Logged in");
            Ok(Report {
                data: json!({
                    "account_id": session.account_id,
                    "login_time": session.login_time,
                }),
                text: format!("Logged in to AWS account {}", session.account_id),
            })
        }

        Commands::Logout => {
            // Local session is cleared even when the backend call fails
            if let Err(err) = client.logout().await {
                debug!(code = %err.code, "Backend logout failed");
            }
            Ok(Report::message("Logged out"))
        }

        Commands::Whoami => {
            ctx.require_login()?;
            let user = client.current_user().await?;
            let profile = ctx.session.profile();
            let mut report = Report::json(&json!({ "profile": profile, "user": user }))?;
            if let Some(profile) = profile {
                report.text = format!(
                    "Account:    {}\nRegion:     {}\nLogged in:  {}",
                    profile.account_id,
                    profile.region.as_deref().unwrap_or("default"),
                    profile.login_time.format("%Y-%m-%d %H:%M:%S UTC"),
                );
            }
            Ok(report)
        }

        Commands::Dashboard { watch, interval } => {
            ctx.require_login()?;
            let interval = interval
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or_else(|| ctx.settings.refresh_interval_or(ctx.config.refresh_interval));
            let aggregator = Arc::new(
                DashboardAggregator::new(client.clone(), ctx.session.clone())
                    .with_refresh_interval(interval),
            );
            if watch {
                watch_dashboard(ctx, aggregator, json).await
            } else {
                match aggregator.refresh().await {
                    CycleOutcome::Failed { error, .. } => Err(error),
                    CycleOutcome::Cancelled { .. } => Err(ApiError::cancelled()),
                    CycleOutcome::Unauthenticated => Err(ApiError::session_expired()),
                    CycleOutcome::Committed { .. } | CycleOutcome::Stale { .. } => {
                        dashboard_report(&aggregator.snapshot())
                    }
                }
            }
        }

        Commands::Ec2 { command } => {
            ctx.require_login()?;
            match command {
                Ec2Command::Instances { force } => Report::json(&client.ec2_instances(force).await?),
                Ec2Command::Summary => Report::json(&client.ec2_instance_summary().await?),
                Ec2Command::Instance { id } => Report::json(&client.ec2_instance(&id).await?),
                Ec2Command::Metrics { id, range } => {
                    let range = range.resolve_optional()?;
                    Report::json(&client.ec2_instance_metrics(&id, range).await?)
                }
                Ec2Command::CostEstimate => Report::json(&client.ec2_cost_estimate().await?),
                Ec2Command::Regions => Report::json(&client.ec2_regions().await?),
            }
        }

        Commands::S3 { command } => {
            ctx.require_login()?;
            match command {
                S3Command::Buckets { force } => Report::json(&client.s3_buckets(force).await?),
                S3Command::Bucket { name } => Report::json(&client.s3_bucket(&name).await?),
                S3Command::Metrics { name } => Report::json(&client.s3_bucket_metrics(&name).await?),
                S3Command::Summary => Report::json(&client.s3_summary().await?),
            }
        }

        Commands::Guardduty { command } => {
            ctx.require_login()?;
            match command {
                GuardDutyCommand::Findings {
                    severity,
                    days,
                    force,
                } => {
                    let filter = FindingsFilter {
                        severity,
                        days,
                        force_refresh: force,
                    };
                    Report::json(&client.guardduty_findings(&filter).await?)
                }
                GuardDutyCommand::Finding { id } => Report::json(&client.guardduty_finding(&id).await?),
                GuardDutyCommand::Summary => Report::json(&client.guardduty_summary().await?),
                GuardDutyCommand::Detectors => Report::json(&client.guardduty_detectors().await?),
            }
        }

        Commands::Costs { command } => {
            ctx.require_login()?;
            match command {
                CostsCommand::Usage { range, granularity } => {
                    let granularity = Granularity::parse(&granularity).ok_or_else(|| {
                        ApiError::validation(format!(
                            "unknown granularity '{granularity}', expected DAILY, MONTHLY or HOURLY"
                        ))
                    })?;
                    let query = CostQuery {
                        range: range.resolve()?,
                        granularity,
                    };
                    Report::json(&client.cost_and_usage(&query).await?)
                }
                CostsCommand::ByService { range } => {
                    Report::json(&client.cost_by_service(&range.resolve()?).await?)
                }
                CostsCommand::Forecast { range } => {
                    Report::json(&client.cost_forecast(&range.resolve()?).await?)
                }
                CostsCommand::Summary => Report::json(&client.cost_summary().await?),
            }
        }

        Commands::Architecture { command } => {
            ctx.require_login()?;
            match command {
                ArchitectureCommand::Health => Report::json(&client.architecture_health().await?),
                ArchitectureCommand::Recommendations => {
                    Report::json(&client.architecture_recommendations().await?)
                }
                ArchitectureCommand::Analyze => Report::json(&client.analyze_architecture().await?),
            }
        }

        Commands::Settings { command } => match command {
            SettingsCommand::Show { remote: false } => Report::json(&ctx.settings.load()),
            SettingsCommand::Show { remote: true } => {
                ctx.require_login()?;
                Report::json(&client.remote_settings().await?)
            }
            SettingsCommand::SetRefresh { secs, remote } => {
                if secs == 0 {
                    return Err(ApiError::validation("refresh interval must be positive"));
                }
                let settings = ctx.settings.update(|s| s.refresh_interval_secs = secs)?;
                if remote {
                    ctx.require_login()?;
                    let mut changes = Map::new();
                    changes.insert("refresh_interval_secs".to_string(), json!(secs));
                    let saved = client.patch_remote_settings(changes).await?;
                    return Report::json(&json!({ "local": settings, "remote": saved }));
                }
                Report::json(&settings)
            }
            SettingsCommand::Reset { remote } => {
                let settings = ctx.settings.reset()?;
                if remote {
                    ctx.require_login()?;
                    let saved = client.reset_remote_settings().await?;
                    return Report::json(&json!({ "local": settings, "remote": saved }));
                }
                Report::json(&settings)
            }
        },
    }
}

fn dashboard_report(state: &DashboardState) -> ApiResult<Report> {
    let mut report = Report::json(&json!({
        "cards": metric_cards(&state.data),
        "dataset": state.data,
        "last_updated": state.last_updated,
    }))?;
    report.text = render_text(state);
    Ok(report)
}

/// Redraw on every committed or failed cycle until Ctrl-C or session loss.
async fn watch_dashboard(
    ctx: &Context,
    aggregator: Arc<DashboardAggregator<CloudHealthClient>>,
    json: bool,
) -> ApiResult<Report> {
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(aggregator.clone().run(shutdown.clone()));
    let mut updates = aggregator.subscribe();
    let mut auth = ctx.session.subscribe();
    let mut shown: Option<(Option<chrono::DateTime<Utc>>, Option<ApiError>)> = None;

    let outcome = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(Report::message("Stopped")),
            lost = auth.wait_for(|s| !s.is_authenticated()) => {
                if lost.is_ok() {
                    break Err(ApiError::session_expired());
                }
                break Ok(Report::message("Stopped"));
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break Ok(Report::message("Stopped"));
                }
                let state = updates.borrow_and_update().clone();
                let key = (state.last_updated, state.error.clone());
                if state.loading || shown.as_ref() == Some(&key) {
                    continue;
                }
                shown = Some(key);
                emit(dashboard_report(&state), json);
            }
        }
    };

    shutdown.cancel();
    if let Err(e) = handle.await {
        debug!(error = %e, "Dashboard refresh task ended abnormally");
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: Option<NaiveDate>, days: u32) -> RangeArgs {
        RangeArgs {
            start,
            end: NaiveDate::from_ymd_opt(2026, 10, 18),
            days,
        }
    }

    #[test]
    fn trailing_range_ends_on_end_date() {
        let resolved = range(None, 30).resolve().unwrap();
        assert_eq!(resolved.start, NaiveDate::from_ymd_opt(2026, 9, 18).unwrap());
    }

    #[test]
    fn days_past_the_calendar_are_a_validation_error() {
        let err = range(None, 200_000_000).resolve().unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[test]
    fn start_after_end_is_rejected() {
        let err = range(NaiveDate::from_ymd_opt(2026, 11, 1), 7)
            .resolve()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);
    }
}
