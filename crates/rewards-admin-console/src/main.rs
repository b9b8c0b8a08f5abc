//! `rewards-admin` command line console
//!
//! Lists and moderates businesses, creators, categories and content on the
//! rewards platform through its super-admin API.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use rewards_admin_client::{ApiError, MutationAck, QueryParams};
use rewards_admin_console::{
    BusinessFilters, CategoryFilters, CategoryFormDialog, ConfirmDeleteDialog, ConsoleError,
    ContentFilters, Coordinator, CreatorFilters, CreatorSort, Dialog, Mutation,
    Notifier, Result, SuspendDialog, dashboard, dialogs::AccountKind,
};
use rewards_admin_core::{AccountStatus, Business, Config, RecordId};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Command line interface for the rewards admin console
#[derive(Parser)]
#[command(
    name = "rewards-admin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Super-admin console for the rewards platform",
    long_about = "List, filter and moderate businesses, creators, categories and content through the rewards platform admin API."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Session token (overrides configuration)
    #[arg(long, env = "REWARDS_ADMIN_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable structured JSON logging
    #[arg(long)]
    json: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Show platform summary
    Dashboard,

    /// Manage categories
    Categories {
        /// Category subcommand
        #[command(subcommand)]
        action: CategoryCommands,
    },

    /// Moderate businesses
    Businesses {
        /// Business subcommand
        #[command(subcommand)]
        action: BusinessCommands,
    },

    /// Moderate creators
    Creators {
        /// Creator subcommand
        #[command(subcommand)]
        action: CreatorCommands,
    },

    /// Browse submitted content
    Content {
        /// Content subcommand
        #[command(subcommand)]
        action: ContentCommands,
    },

    /// Generate a report
    Reports {
        /// Report type
        #[arg(long = "type", value_name = "TYPE")]
        report_type: Option<String>,

        /// Start of the reporting period (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// End of the reporting period (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<NaiveDate>,

        /// Extra query parameter
        #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },

    /// Inspect configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,
    },
}

/// Category subcommands
#[derive(Subcommand)]
enum CategoryCommands {
    /// List categories
    List {
        /// Filter by name or description
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Create a category
    Create {
        /// Category name
        #[arg(long)]
        name: String,

        /// Description
        #[arg(long)]
        description: Option<String>,

        /// Icon URL
        #[arg(long)]
        icon: Option<String>,
    },

    /// Update a category
    Update {
        /// Category id
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New icon URL
        #[arg(long)]
        icon: Option<String>,
    },

    /// Delete a category
    Delete {
        /// Category id
        id: String,

        /// Exact category name, retyped to confirm
        #[arg(long, value_name = "NAME")]
        confirm: String,

        /// Confirm deletion even though businesses use the category
        #[arg(long)]
        acknowledge_dependents: bool,
    },
}

/// Business subcommands
#[derive(Subcommand)]
enum BusinessCommands {
    /// List businesses
    List {
        /// Filter by name
        #[arg(short, long)]
        search: Option<String>,

        /// Category id
        #[arg(long)]
        category: Option<String>,

        /// Only verified businesses
        #[arg(long, conflicts_with = "unverified")]
        verified: bool,

        /// Only unverified businesses
        #[arg(long)]
        unverified: bool,

        /// Account status (active, suspended)
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one business: info, milestones, content settings and stats
    Show {
        /// Business id
        id: String,
    },

    /// Verify a business
    Verify {
        /// Business id
        id: String,
    },

    /// Suspend a business
    Suspend {
        /// Business id
        id: String,

        /// Reason shown to the business (at least 10 characters)
        #[arg(long)]
        reason: String,
    },

    /// Lift a business suspension
    Unsuspend {
        /// Business id
        id: String,
    },

    /// Delete a business
    Delete {
        /// Business id
        id: String,

        /// Exact business name, retyped to confirm
        #[arg(long, value_name = "NAME")]
        confirm: String,
    },
}

/// Creator subcommands
#[derive(Subcommand)]
enum CreatorCommands {
    /// List creators
    List {
        /// Filter by name or email
        #[arg(short, long)]
        search: Option<String>,

        /// Account status (active, suspended)
        #[arg(long)]
        status: Option<String>,

        /// Joined on or after (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Joined on or before (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<NaiveDate>,

        /// Sort order
        #[arg(long, default_value = "createdAt_desc")]
        sort: String,
    },

    /// Show one creator
    Show {
        /// Creator id
        id: String,
    },

    /// Suspend a creator
    Suspend {
        /// Creator id
        id: String,

        /// Reason shown to the creator (at least 10 characters)
        #[arg(long)]
        reason: String,
    },

    /// Lift a creator suspension
    Unsuspend {
        /// Creator id
        id: String,
    },
}

/// Content subcommands
#[derive(Subcommand)]
enum ContentCommands {
    /// List submitted content
    List {
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Moderation status
        #[arg(long)]
        status: Option<String>,

        /// Content type
        #[arg(long = "type")]
        content_type: Option<String>,
    },
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

/// Main entry point for the console
///
/// # Errors
///
/// Returns error if configuration is invalid or the requested operation fails
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for development convenience)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: .env file not loaded: {e}");
    }

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if cli.json {
        config.logging.format = "json".to_string();
    }
    if cli.token.is_some() {
        config.auth.token.clone_from(&cli.token);
    }

    rewards_admin_core::init_logging(&config.logging);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        api = %config.api.base_url,
        "Rewards admin console starting"
    );

    if let Commands::Config { show } = cli.command {
        return handle_config_command(&config, show);
    }

    let console = rewards_admin_console::connect(&config, Notifier::new())?;
    let coordinator = console.coordinator();
    let out = Output { format: cli.format };

    match cli.command {
        Commands::Dashboard => show_dashboard(coordinator, out).await,
        Commands::Categories { action } => handle_category_command(coordinator, out, action).await,
        Commands::Businesses { action } => handle_business_command(coordinator, out, action).await,
        Commands::Creators { action } => handle_creator_command(coordinator, out, action).await,
        Commands::Content { action } => handle_content_command(coordinator, out, action).await,
        Commands::Reports {
            report_type,
            start_date,
            end_date,
            params,
        } => generate_report(coordinator, report_type, start_date, end_date, params).await,
        Commands::Config { .. } => Ok(()),
    }
}

/// Load configuration from file and environment
///
/// # Errors
///
/// Returns error if the configuration cannot be read or is invalid
fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        debug!("Loading configuration from: {}", path.display());
    }
    Ok(Config::load_from(path)?)
}

/// Handle configuration commands
///
/// # Errors
///
/// Returns error if configuration cannot be serialized
fn handle_config_command(config: &Config, show: bool) -> Result<()> {
    if show {
        let config_toml = toml::to_string_pretty(config)?;
        println!("{config_toml}");
    } else {
        println!("Configuration is valid");
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Output {
    format: OutputFormat,
}

impl Output {
    /// Print `value` as JSON, or `rows` as an aligned table
    fn emit<T: Serialize>(self, value: &T, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Table => print_table(headers, rows),
        }
        Ok(())
    }
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    println!("{}", render_row(headers.iter().copied(), &widths));
    for row in rows {
        println!("{}", render_row(row.iter().map(String::as_str), &widths));
    }
    if rows.is_empty() {
        println!("(no results)");
    }
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_string()
}

fn parse_status(raw: Option<&str>) -> Result<Option<AccountStatus>> {
    raw.map(str::parse::<AccountStatus>)
        .transpose()
        .map_err(|err| match err {
            rewards_admin_core::Error::Validation { field, message } => {
                ConsoleError::validation(field, message)
            }
            other => ConsoleError::from(other),
        })
}

/// Run a mutation and print the resulting toast
///
/// # Errors
///
/// Returns the API error after the error toast is printed
async fn run_mutation(
    coordinator: &Coordinator,
    dialog: &mut dyn Dialog,
) -> Result<MutationAck> {
    let mutation = dialog.submit()?;
    let result = coordinator.mutate(&mutation).await;
    dialog.complete(&result);
    if let Some(toast) = coordinator.notifier().last() {
        println!("{}", toast.message);
    }
    Ok(result?)
}

async fn show_dashboard(coordinator: &Coordinator, out: Output) -> Result<()> {
    let stats = coordinator.dashboard_stats().await?;
    let summary = dashboard::summarize(&stats);

    if out.format == OutputFormat::Json {
        return out.emit(&summary, &[], &[]);
    }

    if let Some(banner) = &summary.action_required {
        println!("Action required: {banner}\n");
    }
    let rows: Vec<Vec<String>> = summary
        .cards
        .iter()
        .map(|card| {
            vec![
                card.title.to_string(),
                card.value.to_string(),
                format!("{:+}% (est.)", card.growth_percent),
            ]
        })
        .collect();
    print_table(&["METRIC", "VALUE", "GROWTH"], &rows);

    println!("\nBusinesses by category");
    let rows: Vec<Vec<String>> = summary
        .categories
        .iter()
        .map(|slice| {
            vec![
                slice.name.clone(),
                slice.count.to_string(),
                format!("{:.1}%", slice.percent),
            ]
        })
        .collect();
    print_table(&["CATEGORY", "BUSINESSES", "SHARE"], &rows);

    println!("\nUser growth");
    let rows: Vec<Vec<String>> = summary
        .growth_charts
        .user_growth
        .iter()
        .map(|point| {
            vec![
                point.date.clone(),
                point.content_creators.to_string(),
                point.local_businesses.to_string(),
            ]
        })
        .collect();
    print_table(&["DATE", "CREATORS", "BUSINESSES"], &rows);

    println!("\nContent growth");
    let rows: Vec<Vec<String>> = summary
        .growth_charts
        .content_growth
        .iter()
        .map(|point| {
            vec![
                point.date.clone(),
                point.accepted.to_string(),
                point.rejected.to_string(),
                point.pending.to_string(),
            ]
        })
        .collect();
    print_table(&["DATE", "ACCEPTED", "REJECTED", "PENDING"], &rows);

    println!("\nRecent activity");
    let rows: Vec<Vec<String>> = summary
        .recent_activity
        .iter()
        .map(|entry| {
            vec![
                entry
                    .timestamp
                    .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string()),
                or_dash(Some(entry.kind.as_str())),
                entry.description.clone(),
            ]
        })
        .collect();
    print_table(&["WHEN", "TYPE", "DESCRIPTION"], &rows);
    Ok(())
}

async fn handle_category_command(
    coordinator: &Coordinator,
    out: Output,
    action: CategoryCommands,
) -> Result<()> {
    match action {
        CategoryCommands::List { search } => {
            let categories = coordinator.categories().await?;
            let filters = CategoryFilters {
                search: search.unwrap_or_default(),
            };
            let shown = filters.apply(&categories);
            let rows = shown
                .iter()
                .map(|c| {
                    vec![
                        c.id.to_string(),
                        c.name.clone(),
                        c.business_count.to_string(),
                        or_dash(c.description.as_deref()),
                    ]
                })
                .collect::<Vec<_>>();
            out.emit(&shown, &["ID", "NAME", "BUSINESSES", "DESCRIPTION"], &rows)
        }
        CategoryCommands::Create {
            name,
            description,
            icon,
        } => {
            let mut dialog = CategoryFormDialog::create();
            dialog.name = name;
            dialog.description = description.unwrap_or_default();
            dialog.icon = icon.unwrap_or_default();
            run_mutation(coordinator, &mut dialog).await.map(|_| ())
        }
        CategoryCommands::Update {
            id,
            name,
            description,
            icon,
        } => {
            let category = find_category(coordinator, &id).await?;
            let mut dialog = CategoryFormDialog::edit(&category);
            if let Some(name) = name {
                dialog.name = name;
            }
            if let Some(description) = description {
                dialog.description = description;
            }
            if let Some(icon) = icon {
                dialog.icon = icon;
            }
            run_mutation(coordinator, &mut dialog).await.map(|_| ())
        }
        CategoryCommands::Delete {
            id,
            confirm,
            acknowledge_dependents,
        } => {
            let category = find_category(coordinator, &id).await?;
            let mut dialog = ConfirmDeleteDialog::for_category(&category);
            dialog.set_typed(confirm);
            if acknowledge_dependents {
                dialog.acknowledge_dependents();
            }
            check_delete_confirmation(&dialog, acknowledge_dependents)?;
            match run_mutation(coordinator, &mut dialog).await {
                Err(ConsoleError::Api(ApiError::Conflict {
                    dependent_count: Some(count),
                    ..
                })) => Err(ConsoleError::confirmation_required(format!(
                    "{count} businesses still use '{}'; reassign them before deleting",
                    dialog.entity_name()
                ))),
                other => other.map(|_| ()),
            }
        }
    }
}

/// Refuse a delete the operator has not fully confirmed, before any request
///
/// # Errors
///
/// Returns `ConfirmationRequired` when the typed name differs, or when
/// businesses depend on the target and `acknowledged` is false
fn check_delete_confirmation(dialog: &ConfirmDeleteDialog, acknowledged: bool) -> Result<()> {
    if let Some(hint) = dialog.hint() {
        return Err(ConsoleError::confirmation_required(format!(
            "{hint}: expected '{}'",
            dialog.entity_name()
        )));
    }
    if dialog.dependent_count() > 0 && !acknowledged {
        return Err(ConsoleError::confirmation_required(format!(
            "{} businesses use '{}'; pass --acknowledge-dependents to proceed",
            dialog.dependent_count(),
            dialog.entity_name()
        )));
    }
    Ok(())
}

async fn find_category(
    coordinator: &Coordinator,
    id: &str,
) -> Result<rewards_admin_core::Category> {
    coordinator
        .categories()
        .await?
        .into_iter()
        .find(|c| c.id.as_str() == id)
        .ok_or_else(|| {
            ConsoleError::Api(ApiError::NotFound {
                message: format!("Category {id} not found"),
            })
        })
}

async fn handle_business_command(
    coordinator: &Coordinator,
    out: Output,
    action: BusinessCommands,
) -> Result<()> {
    match action {
        BusinessCommands::List {
            search,
            category,
            verified,
            unverified,
            status,
        } => {
            let filters = BusinessFilters {
                search: search.unwrap_or_default(),
                category: category.map(RecordId::new),
                verified: match (verified, unverified) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                status: parse_status(status.as_deref())?,
            };
            let page = coordinator.businesses(&filters).await?;
            let counts = page.filter_counts;
            if out.format == OutputFormat::Table {
                println!(
                    "Total: {}  Verified: {}  Unverified: {}  Suspended: {}\n",
                    counts.total, counts.verified, counts.unverified, counts.suspended
                );
            }
            let rows: Vec<Vec<String>> = page
                .businesses
                .iter()
                .map(|b| {
                    vec![
                        b.id.to_string(),
                        b.business_name.clone(),
                        b.category
                            .as_ref()
                            .map_or_else(|| "-".to_string(), |c| c.label().to_string()),
                        b.location
                            .as_ref()
                            .map_or_else(|| "-".to_string(), ToString::to_string),
                        if b.is_verified { "Verified" } else { "Unverified" }.to_string(),
                        b.status.to_string(),
                    ]
                })
                .collect();
            out.emit(
                &page,
                &["ID", "NAME", "CATEGORY", "LOCATION", "VERIFIED", "STATUS"],
                &rows,
            )
        }
        BusinessCommands::Show { id } => {
            let business = find_business(coordinator, &id).await?;
            out.emit(&business, &["SECTION", "FIELD", "VALUE"], &business_detail_rows(&business))
        }
        BusinessCommands::Verify { id } => {
            let mutation = Mutation::VerifyBusiness {
                id: RecordId::new(id),
            };
            mutate_and_report(coordinator, &mutation).await
        }
        BusinessCommands::Suspend { id, reason } => {
            let mut dialog =
                SuspendDialog::new(AccountKind::Business, RecordId::new(id.clone()), id);
            dialog.set_reason(reason);
            run_mutation(coordinator, &mut dialog).await.map(|_| ())
        }
        BusinessCommands::Unsuspend { id } => {
            let mutation = Mutation::UnsuspendBusiness {
                id: RecordId::new(id),
            };
            mutate_and_report(coordinator, &mutation).await
        }
        BusinessCommands::Delete { id, confirm } => {
            let business = find_business(coordinator, &id).await?;
            let mut dialog = ConfirmDeleteDialog::for_business(&business);
            dialog.set_typed(confirm);
            check_delete_confirmation(&dialog, false)?;
            run_mutation(coordinator, &mut dialog).await.map(|_| ())
        }
    }
}

/// Resolve a business through the cached unfiltered listing
///
/// The admin API has no single-business endpoint.
async fn find_business(coordinator: &Coordinator, id: &str) -> Result<Business> {
    coordinator
        .businesses(&BusinessFilters::default())
        .await?
        .businesses
        .into_iter()
        .find(|b| b.id.as_str() == id)
        .ok_or_else(|| {
            ConsoleError::Api(ApiError::NotFound {
                message: format!("Business {id} not found"),
            })
        })
}

fn yes_no(flag: bool) -> String {
    if flag { "Yes" } else { "No" }.to_string()
}

/// Detail rows grouped the way the business dialog tabs are
fn business_detail_rows(business: &Business) -> Vec<Vec<String>> {
    let row = |section: &str, field: &str, value: String| {
        vec![section.to_string(), field.to_string(), value]
    };
    let date = |at: Option<chrono::DateTime<chrono::Utc>>| {
        at.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d").to_string())
    };
    let contact = business.contact_info.clone().unwrap_or_default();
    let location = business.location.clone().unwrap_or_default();

    let mut rows = vec![
        row("Info", "ID", business.id.to_string()),
        row("Info", "Name", business.business_name.clone()),
        row("Info", "Description", or_dash(business.description.as_deref())),
        row(
            "Info",
            "Category",
            business
                .category
                .as_ref()
                .map_or_else(|| "-".to_string(), |c| c.label().to_string()),
        ),
        row(
            "Info",
            "Owner",
            business
                .owner
                .as_ref()
                .map_or_else(|| "-".to_string(), |o| o.label().to_string()),
        ),
        row("Info", "Address", or_dash(location.address.as_deref())),
        row("Info", "Location", location.to_string()),
        row("Info", "Phone", or_dash(contact.phone.as_deref())),
        row("Info", "Email", or_dash(contact.email.as_deref())),
        row("Info", "Verified", yes_no(business.is_verified)),
        row("Info", "Verified at", date(business.verified_at)),
        row("Info", "Status", business.status.to_string()),
        row("Info", "Joined", date(business.created_at)),
    ];

    if business.milestones.is_empty() {
        rows.push(row("Milestones", "-", "No milestones configured".to_string()));
    }
    for milestone in &business.milestones {
        let mut value = milestone.reward_title.clone();
        if let Some(description) = milestone.reward_description.as_deref().filter(|d| !d.is_empty()) {
            value.push_str(": ");
            value.push_str(description);
        }
        rows.push(row("Milestones", &format!("{} pts", milestone.points), value));
    }

    let settings = business.content_settings.unwrap_or_default();
    rows.push(row("Content", "Accepts photos", yes_no(settings.accepts_photo)));
    rows.push(row("Content", "Accepts videos", yes_no(settings.accepts_video)));

    rows.push(row("Stats", "Content received", business.total_content.to_string()));
    rows.push(row(
        "Stats",
        "Unique creators",
        business.total_unique_creators.to_string(),
    ));
    rows.push(row("Stats", "Points awarded", business.total_points.to_string()));
    rows
}

async fn mutate_and_report(coordinator: &Coordinator, mutation: &Mutation) -> Result<()> {
    let result = coordinator.mutate(mutation).await;
    if let Some(toast) = coordinator.notifier().last() {
        println!("{}", toast.message);
    }
    result.map(|_| ()).map_err(ConsoleError::from)
}

async fn handle_creator_command(
    coordinator: &Coordinator,
    out: Output,
    action: CreatorCommands,
) -> Result<()> {
    match action {
        CreatorCommands::List {
            search,
            status,
            start_date,
            end_date,
            sort,
        } => {
            let filters = CreatorFilters {
                search: search.unwrap_or_default(),
                status: parse_status(status.as_deref())?,
                start_date,
                end_date,
                sort: sort.parse::<CreatorSort>()?,
            };
            let page = coordinator.creators(&filters).await?;
            let rows: Vec<Vec<String>> = page
                .creators
                .iter()
                .map(|c| {
                    vec![
                        c.id.to_string(),
                        c.display_name().to_string(),
                        or_dash(c.email.as_deref()),
                        c.total_submissions.to_string(),
                        c.total_points.to_string(),
                        c.status.to_string(),
                    ]
                })
                .collect();
            out.emit(
                &page,
                &["ID", "NAME", "EMAIL", "SUBMISSIONS", "POINTS", "STATUS"],
                &rows,
            )
        }
        CreatorCommands::Show { id } => {
            let creator = coordinator
                .service()
                .creator_details(&RecordId::new(id))
                .await?;
            let rows = vec![
                vec!["ID".to_string(), creator.id.to_string()],
                vec!["Name".to_string(), creator.display_name().to_string()],
                vec!["Email".to_string(), or_dash(creator.email.as_deref())],
                vec!["Submissions".to_string(), creator.total_submissions.to_string()],
                vec!["Points".to_string(), creator.total_points.to_string()],
                vec!["Status".to_string(), creator.status.to_string()],
            ];
            out.emit(&creator, &["FIELD", "VALUE"], &rows)
        }
        CreatorCommands::Suspend { id, reason } => {
            let mut dialog =
                SuspendDialog::new(AccountKind::Creator, RecordId::new(id.clone()), id);
            dialog.set_reason(reason);
            run_mutation(coordinator, &mut dialog).await.map(|_| ())
        }
        CreatorCommands::Unsuspend { id } => {
            let mutation = Mutation::UnsuspendCreator {
                id: RecordId::new(id),
            };
            mutate_and_report(coordinator, &mutation).await
        }
    }
}

async fn handle_content_command(
    coordinator: &Coordinator,
    out: Output,
    action: ContentCommands,
) -> Result<()> {
    match action {
        ContentCommands::List {
            search,
            status,
            content_type,
        } => {
            let filters = ContentFilters {
                search: search.unwrap_or_default(),
                status,
                content_type,
            };
            let page = coordinator.content(&filters).await?;
            let rows: Vec<Vec<String>> = page
                .content
                .iter()
                .map(|item| {
                    vec![
                        item.id.to_string(),
                        or_dash(item.content_type.as_deref()),
                        item.creator
                            .as_ref()
                            .map_or_else(|| "-".to_string(), |r| r.label().to_string()),
                        item.business
                            .as_ref()
                            .map_or_else(|| "-".to_string(), |r| r.label().to_string()),
                        or_dash(item.status.as_deref()),
                        item.points.to_string(),
                    ]
                })
                .collect();
            out.emit(
                &page,
                &["ID", "TYPE", "CREATOR", "BUSINESS", "STATUS", "POINTS"],
                &rows,
            )
        }
    }
}

async fn generate_report(
    coordinator: &Coordinator,
    report_type: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    extra: Vec<(String, String)>,
) -> Result<()> {
    let mut params = QueryParams::new();
    if let Some(kind) = report_type {
        params.push(("type".to_string(), kind));
    }
    if let Some(date) = start_date {
        params.push(("startDate".to_string(), date.format("%Y-%m-%d").to_string()));
    }
    if let Some(date) = end_date {
        params.push(("endDate".to_string(), date.format("%Y-%m-%d").to_string()));
    }
    params.extend(extra);

    let report = coordinator.service().generate_report(&params).await?;
    // Report shapes vary by type, so they are always printed as JSON.
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use rewards_admin_client::{AdminService, ApiClient, StaticToken};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn coordinator_for(server: &MockServer) -> Coordinator {
        let client =
            ApiClient::new(server.uri()).with_token_supplier(Arc::new(StaticToken::new("t0k3n")));
        Coordinator::new(AdminService::new(client), Notifier::new())
    }

    fn table() -> Output {
        Output {
            format: OutputFormat::Table,
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_category_delete_requires_confirm() {
        let parsed = Cli::try_parse_from(["rewards-admin", "categories", "delete", "c1"]);

        assert!(parsed.is_err());
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("groupBy=week"),
            Ok(("groupBy".to_string(), "week".to_string()))
        );
        assert!(parse_key_value("=week").is_err());
        assert!(parse_key_value("week").is_err());
    }

    #[test]
    fn test_verified_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "rewards-admin",
            "businesses",
            "list",
            "--verified",
            "--unverified",
        ]);

        assert!(parsed.is_err());
    }

    #[test]
    fn test_business_show_takes_an_id() {
        let cli = Cli::try_parse_from(["rewards-admin", "businesses", "show", "b1"]).unwrap();

        assert!(matches!(
            cli.command,
            Commands::Businesses {
                action: BusinessCommands::Show { ref id }
            } if id == "b1"
        ));
    }

    #[test]
    fn test_business_detail_rows_cover_each_tab() {
        let business: Business = serde_json::from_value(json!({
            "_id": "b1",
            "businessName": "Corner Cafe",
            "category": {"_id": "c1", "name": "Food"},
            "contactInfo": {"phone": "555-0100"},
            "contentSettings": {"acceptsPhoto": true},
            "milestones": [
                {"points": 100, "rewardTitle": "Free coffee", "rewardDescription": "Any size"}
            ],
            "totalContent": 12,
            "totalUniqueCreators": 5,
            "totalPoints": 340
        }))
        .unwrap();

        let rows = business_detail_rows(&business);
        let find = |section: &str, field: &str| {
            rows.iter()
                .find(|r| r[0] == section && r[1] == field)
                .map(|r| r[2].clone())
        };

        assert_eq!(find("Info", "Category").as_deref(), Some("Food"));
        assert_eq!(find("Info", "Phone").as_deref(), Some("555-0100"));
        assert_eq!(find("Info", "Email").as_deref(), Some("-"));
        assert_eq!(
            find("Milestones", "100 pts").as_deref(),
            Some("Free coffee: Any size")
        );
        assert_eq!(find("Content", "Accepts photos").as_deref(), Some("Yes"));
        assert_eq!(find("Content", "Accepts videos").as_deref(), Some("No"));
        assert_eq!(find("Stats", "Unique creators").as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn test_category_delete_with_dependents_needs_acknowledgement() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "categories": [{"_id": "c1", "name": "Food", "businessCount": 3}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/admin/categories/c1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let cli = Cli::try_parse_from([
            "rewards-admin",
            "categories",
            "delete",
            "c1",
            "--confirm",
            "Food",
        ])
        .unwrap();
        let Commands::Categories { action } = cli.command else {
            panic!("expected a categories command");
        };

        let err = handle_category_command(&coordinator_for(&server), table(), action)
            .await
            .unwrap_err();

        assert!(matches!(err, ConsoleError::ConfirmationRequired { .. }));
        let message = err.to_string();
        assert!(message.contains("3 businesses use 'Food'"));
        assert!(message.contains("--acknowledge-dependents"));
    }

    #[tokio::test]
    async fn test_business_show_for_unknown_id_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/businesses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "businesses": [{"_id": "b1", "businessName": "Corner Cafe"}]
            })))
            .mount(&server)
            .await;

        let err = find_business(&coordinator_for(&server), "b2").await.unwrap_err();

        assert!(matches!(err, ConsoleError::Api(ApiError::NotFound { .. })));
    }
}
