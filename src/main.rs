use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod controller;
mod dashboard;
mod error;
mod gesture;
mod input;
mod models;
mod notifications;
mod preferences;
mod queue;
mod report;
mod risk;
mod seed;
mod state;
mod store;
mod ticker;

use config::ReviewSettings;
use controller::{ReviewController, ReviewOutcome};
use dashboard::{DashboardViewModel, KpiCategory, StatusFilter};
use error::InputError;
use input::ReviewInput;
use models::AgentType;
use preferences::{FilePreferences, Theme};
use state::{AppHandle, AppState, Command, SettingsPatch};

#[derive(Parser)]
#[command(name = "fraud-review")]
#[command(about = "Swipe-driven review desk for flagged admissions and financial aid cases", long_about = None)]
struct Cli {
    /// Load cases, notifications and KPIs from a JSON file instead of the built-in set
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print KPIs, the risk trend and the filtered alert table
    Dashboard {
        #[arg(long, value_enum, default_value_t = StatusFilter::All)]
        status: StatusFilter,
        #[arg(long, default_value = "")]
        search: String,
        /// Click a KPI card; repeat to click again
        #[arg(long, value_enum)]
        kpi: Vec<KpiCategory>,
        #[arg(long, value_enum)]
        disable_agent: Vec<AgentType>,
    },
    /// Review pending cases one card at a time
    Review {
        /// Read review commands from a file instead of stdin
        #[arg(long)]
        script: Option<PathBuf>,
    },
    /// Write the dashboard as a markdown report
    Report {
        #[arg(long, value_enum, default_value_t = StatusFilter::All)]
        status: StatusFilter,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "fraud-report.md")]
        out: PathBuf,
    },
    /// Export the filtered alert table as CSV
    Export {
        #[arg(long, value_enum, default_value_t = StatusFilter::All)]
        status: StatusFilter,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "fraud-cases.csv")]
        out: PathBuf,
    },
    /// Show or change the persisted theme
    Theme {
        #[arg(value_enum, default_value_t = ThemeAction::Show)]
        action: ThemeAction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThemeAction {
    Show,
    Toggle,
    Light,
    Dark,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = config::load_settings();
    init_tracing(&settings);

    if let Commands::Theme { action } = cli.command {
        return run_theme(&settings, action);
    }

    let dataset = match cli.dataset.as_deref() {
        Some(path) => seed::load_dataset(path)
            .with_context(|| format!("failed to load dataset from {}", path.display()))?,
        None => seed::dataset().context("built-in dataset is malformed")?,
    };
    let app = AppHandle::new(AppState::bootstrap(dataset));
    if app.read(|state| state.cases().is_empty()) {
        warn!("dataset contains no cases");
    }

    match cli.command {
        Commands::Dashboard {
            status,
            search,
            kpi,
            disable_agent,
        } => {
            if !disable_agent.is_empty() {
                app.dispatch(Command::UpdateSettings(SettingsPatch {
                    agents: disable_agent.iter().map(|agent| (*agent, false)).collect(),
                    ..SettingsPatch::default()
                }));
            }
            let view = filtered_view(&app, status, &search, &kpi);
            let notes = app.read(|state| state.notifications().all().to_vec());
            print!("{}", report::build_report(&view.snapshot(), &notes));
        }
        Commands::Review { script } => {
            run_review(app, &settings, script).await?;
        }
        Commands::Report {
            status,
            search,
            out,
        } => {
            let view = filtered_view(&app, status, &search, &[]);
            let notes = app.read(|state| state.notifications().all().to_vec());
            let report = report::build_report(&view.snapshot(), &notes);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export {
            status,
            search,
            out,
        } => {
            let view = filtered_view(&app, status, &search, &[]);
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            let written = report::write_cases_csv(file, &view.filtered_cases())?;
            println!("Exported {written} cases to {}.", out.display());
        }
        Commands::Theme { .. } => {}
    }

    Ok(())
}

fn init_tracing(settings: &ReviewSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn filtered_view(
    app: &AppHandle,
    status: StatusFilter,
    search: &str,
    kpis: &[KpiCategory],
) -> DashboardViewModel {
    let mut view = DashboardViewModel::new(app.clone());
    view.set_filter_status(status);
    view.set_search_query(search);
    for category in kpis {
        view.select_kpi(*category);
    }
    view
}

fn run_theme(settings: &ReviewSettings, action: ThemeAction) -> anyhow::Result<()> {
    let mut store = FilePreferences::new(&settings.preferences_path);
    let theme = match action {
        ThemeAction::Show => preferences::load_theme(&store, Theme::Light)?,
        ThemeAction::Toggle => preferences::toggle_theme(&mut store, Theme::Light)?,
        ThemeAction::Light | ThemeAction::Dark => {
            let theme = if action == ThemeAction::Light {
                Theme::Light
            } else {
                Theme::Dark
            };
            preferences::save_theme(&mut store, theme)?;
            theme
        }
    };
    println!("Theme: {theme} ({})", store.path().display());
    Ok(())
}

enum LineSource {
    Script(std::vec::IntoIter<String>),
    Stdin(Lines<BufReader<Stdin>>),
}

impl LineSource {
    async fn next_line(&mut self) -> anyhow::Result<Option<String>> {
        match self {
            LineSource::Script(lines) => Ok(lines.next()),
            LineSource::Stdin(lines) => Ok(lines.next_line().await?),
        }
    }
}

async fn run_review(
    app: AppHandle,
    settings: &ReviewSettings,
    script: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut source = match script {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read script {}", path.display()))?;
            LineSource::Script(raw.lines().map(str::to_string).collect::<Vec<_>>().into_iter())
        }
        None => LineSource::Stdin(BufReader::new(tokio::io::stdin()).lines()),
    };

    let rng = match settings.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let ticker = ticker::spawn_ticker(app.clone(), settings.tick_period, rng);
    let mut controller = ReviewController::new(app.clone(), settings.timings());
    let mut summaries = JoinSet::new();

    info!(pending = controller.unseen_ids().len(), "review session started");
    print_current(&controller);

    while let Some(line) = source.next_line().await? {
        if line.trim_start().starts_with('#') {
            continue;
        }
        let input = match input::parse_line(&line) {
            Ok(input) => input,
            Err(InputError::Empty) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match input {
            ReviewInput::Key(key) => {
                let outcome = controller.handle_key(key);
                after_action(&controller, outcome);
            }
            ReviewInput::Drag(offset) => {
                let outcome = controller.handle_drag_end(offset);
                after_action(&controller, outcome);
            }
            ReviewInput::Summary => {
                let Some(case) = controller.current_case() else {
                    println!("No case to summarise.");
                    continue;
                };
                println!("Generating AI summary for {}...", case.id);
                let generator = controller.summaries();
                summaries.spawn(async move {
                    match generator.generate(&case.id).await {
                        Ok(summary) => println!("AI summary for {}: {summary}", case.id),
                        Err(err) => warn!(error = %err, "summary failed"),
                    }
                });
            }
            ReviewInput::Dismiss => {
                let Some(case) = controller.current_case() else {
                    println!("No case to dismiss.");
                    continue;
                };
                let outcome = controller.dismiss(&case.id);
                after_action(&controller, outcome);
            }
            ReviewInput::RequestDocuments {
                document_type,
                email_body,
            } => {
                let Some(case) = controller.current_case() else {
                    println!("No case to request documents for.");
                    continue;
                };
                let body = if email_body.is_empty() {
                    format!(
                        "Please provide your {} documents within {} days.",
                        document_type.as_str(),
                        risk::DOCUMENT_DUE_DAYS
                    )
                } else {
                    email_body
                };
                let outcome = controller.request_documents(&case.id, document_type, &body);
                println!("Documents requested for {}: {}", case.id, outcome.as_str());
            }
            ReviewInput::Reset => {
                controller.reset_session();
                print_current(&controller);
            }
            ReviewInput::Notifications => print_notifications(&app),
            ReviewInput::Open(id) => match app.write(|state| state.open_notification(&id)) {
                Some(case) => print!("{}", report::render_detail(&case)),
                None => println!("Notification {id} has no case to open."),
            },
            ReviewInput::Quit => break,
        }
    }

    while let Some(joined) = summaries.join_next().await {
        if let Err(err) = joined {
            warn!(error = %err, "summary task failed");
        }
    }
    ticker.stop().await;
    let summary = controller.session_summary();
    info!(
        approved = summary.approved,
        escalated = summary.escalated,
        processed = summary.total,
        "review session finished"
    );
    Ok(())
}

fn after_action(controller: &ReviewController, outcome: ReviewOutcome) {
    match outcome {
        ReviewOutcome::Applied => {}
        ReviewOutcome::SnappedBack => {
            println!("Card snapped back.");
            return;
        }
        other => {
            println!("Nothing happened ({}).", other.as_str());
            return;
        }
    }

    let selected = controller
        .app()
        .read(|state| state.selected_case().cloned());
    match selected {
        Some(case) if controller.current_case().map(|c| c.id) == Some(case.id.clone()) => {
            print!("{}", report::render_detail(&case));
            controller.app().dispatch(Command::SelectCase(None));
        }
        _ => print_current(controller),
    }
}

fn print_current(controller: &ReviewController) {
    let Some(case) = controller.current_case() else {
        print!("{}", report::render_session(&controller.session_summary(), true));
        return;
    };
    println!(
        "{} • {}% reviewed",
        controller.position_label(),
        controller.progress_percent()
    );
    if controller.processed_count() > 0 {
        print!("{}", report::render_session(&controller.session_summary(), false));
    }
    print!("{}", report::render_card(&case));
    let behind = controller.stack().len().saturating_sub(1);
    if behind > 0 {
        println!("({behind} more stacked behind)");
    }
}

fn print_notifications(app: &AppHandle) {
    let (toasts, badge) = app.read(|state| {
        (
            state.notifications().toasts().to_vec(),
            state.notifications().badge_label(),
        )
    });
    match badge {
        Some(badge) => println!("Notifications ({badge} unread):"),
        None => println!("Notifications:"),
    }
    for toast in toasts.iter() {
        let marker = if toast.read { " " } else { "*" };
        println!(
            "{marker} {} [{}] {}: {}",
            toast.id,
            toast.kind.as_str(),
            toast.title,
            toast.message
        );
    }
}
