use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use statusboard::{
    events, ui, App, Batch, BoardData, DataSource, ExportDocument, FileSource, GatewaySource,
    Settings, View, ViewOptions,
};
use statusboard_gateway::{
    run_checks, Gateway, PostgrestGateway, Prober, ServiceId, ServiceInput, ServiceUpdate,
    SlackNotifier,
};

#[derive(Parser, Debug)]
#[command(name = "statusboard", version)]
#[command(about = "Terminal status page for HTTP services")]
struct Args {
    /// Settings file (TOML)
    #[arg(short, long, env = "STATUSBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Read events from a JSON file instead of the backend
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Timezone for day boundaries: "local", an IANA name or "+09:00"
    #[arg(short, long)]
    timezone: Option<String>,

    /// Refresh interval (e.g. "30s", "5m")
    #[arg(short, long)]
    refresh: Option<String>,

    /// Log file used while the TUI owns the terminal
    #[arg(long, default_value = "statusboard.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write daily summaries and rejected rows to a JSON file and exit
    Export { path: PathBuf },
    /// Probe every service once, record the results and send alerts
    Check,
    /// Manage monitored services
    Services {
        #[command(subcommand)]
        action: ServicesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ServicesCommand {
    /// List registered services
    List,
    /// Register a new service
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        /// Response time above which a check is WARN (default 3000)
        #[arg(long)]
        threshold_ms: Option<i64>,
    },
    /// Change a service's name, URL or threshold
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        threshold_ms: Option<i64>,
    },
    /// Delete a service
    Remove { id: String },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(ref tz) = args.timezone {
        settings.view.timezone = tz.clone();
    }
    if let Some(ref refresh) = args.refresh {
        settings.view.refresh = refresh.clone();
    }
    // Re-check overrides from the command line.
    settings.view.zone()?;
    let refresh_interval = settings.view.refresh_interval()?;

    match &args.command {
        None => {
            init_logging(Some(&args.log_file))?;
            run(&args, &settings, refresh_interval)
        }
        Some(Command::Export { path }) => {
            init_logging(None)?;
            export_to_file(&args, &settings, path)
        }
        Some(Command::Check) => {
            init_logging(None)?;
            check(&settings)
        }
        Some(Command::Services { action }) => {
            init_logging(None)?;
            services(&settings, action)
        }
    }
}

/// Install the tracing subscriber. The TUI logs to a file so output does not
/// tear the screen; commands log to stderr.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("statusboard=info,statusboard_gateway=info"));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                .init();
        }
    }
    Ok(())
}

fn build_gateway(settings: &Settings) -> Result<PostgrestGateway> {
    let backend = &settings.backend;
    let mut builder = PostgrestGateway::builder()
        .timeout(backend.timeout())
        .page_size(backend.page_size)
        .max_rows(backend.max_rows);
    if let Some(ref url) = backend.url {
        builder = builder.url(url);
    }
    if let Some(ref key) = backend.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref token) = backend.access_token {
        builder = builder.access_token(token);
    }
    builder
        .build()
        .context("Backend not configured (set backend.url and backend.api_key, or use --file)")
}

/// Run the TUI against the file or backend source.
fn run(args: &Args, settings: &Settings, refresh_interval: Duration) -> Result<()> {
    let options = ViewOptions::from_settings(settings)?;

    if let Some(ref path) = args.file {
        info!(path = %path.display(), "Starting with file source");
        return run_tui(Box::new(FileSource::new(path)), options, refresh_interval);
    }

    let gateway: Arc<dyn Gateway> = Arc::new(build_gateway(settings)?);
    let rt = tokio::runtime::Runtime::new()?;
    let description = settings.backend.url.clone().unwrap_or_default();
    let mut source = GatewaySource::new(
        gateway,
        rt.handle().clone(),
        &description,
        settings.view.history_days,
    );
    source.refresh();
    info!(backend = %description, "Starting with backend source");

    // The runtime keeps driving fetches while the TUI runs on this thread.
    let result = run_tui(Box::new(source), options, refresh_interval);
    rt.shutdown_timeout(Duration::from_secs(1));
    result
}

fn run_tui(
    source: Box<dyn DataSource>,
    options: ViewOptions,
    refresh_interval: Duration,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal before printing a panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, options);
    app.reload_data();

    let result = run_app(&mut terminal, &mut app, refresh_interval);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let top = (area.height / 2).saturating_sub(2);
                let centered = ratatui::layout::Rect::new(0, top, area.width, 5.min(area.height));
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Dashboard => ui::dashboard::render(frame, app, chunks[2]),
                View::History => ui::history::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Header (1) + tabs (1) + banner (3) + table border (1)
                    events::handle_mouse_event(app, mouse, 6);
                }
                _ => {}
            }
        }

        // Picking up finished loads is cheap; fetching is not.
        app.reload_data();
        if last_refresh.elapsed() >= refresh_interval {
            app.request_refresh();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Fetch one batch synchronously for the non-interactive commands.
fn load_batch(args: &Args, settings: &Settings) -> Result<Batch> {
    if let Some(ref path) = args.file {
        let mut source = FileSource::new(path);
        return match source.poll() {
            Some(batch) => Ok(batch),
            None => bail!(
                "{}",
                source.error().unwrap_or("Failed to read events file")
            ),
        };
    }

    let gateway = build_gateway(settings)?;
    let since = chrono::Utc::now() - chrono::Duration::days(settings.view.history_days);
    let rt = tokio::runtime::Runtime::new()?;
    let (services, events) = rt.block_on(async {
        tokio::try_join!(gateway.latest_statuses(), gateway.fetch_events(Some(since)))
    })?;

    Ok(Batch {
        generation: 1,
        events,
        services,
    })
}

/// Export derived daily summaries to a JSON file
fn export_to_file(args: &Args, settings: &Settings, export_path: &Path) -> Result<()> {
    let zone = settings.view.zone()?;
    let batch = load_batch(args, settings)?;
    let board = BoardData::build(batch, &zone, zone.today(), settings.view.strip_days);

    if !board.rejected.is_empty() {
        warn!(count = board.rejected.len(), "Some events had unusable timestamps");
    }

    ExportDocument::from_board(&board, &zone).write_to(export_path)?;
    println!(
        "Exported {} daily summaries for {} services to: {}",
        board.buckets.summaries().len(),
        board.services.len(),
        export_path.display()
    );
    Ok(())
}

/// One health-check pass over every registered service.
fn check(settings: &Settings) -> Result<()> {
    let gateway = build_gateway(settings)?;
    let prober = Prober::new(settings.backend.timeout())?;
    let notifier = SlackNotifier::from_settings(
        settings.notify.slack_token.as_deref(),
        settings.notify.slack_channel.as_deref(),
    )?;

    let rt = tokio::runtime::Runtime::new()?;
    let outcomes = rt.block_on(run_checks(&gateway, &prober, notifier.as_ref()))?;

    for outcome in &outcomes {
        let previous = outcome
            .previous
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        println!(
            "[{:<5}] {:<24} {:>6}ms  was {:<5}{}{}",
            outcome.result.status,
            outcome.service.name,
            outcome.result.response_time,
            previous,
            if outcome.saved { "" } else { "  (not saved)" },
            if outcome.notified { "  (alert sent)" } else { "" },
        );
    }

    let unsaved = outcomes.iter().filter(|o| !o.saved).count();
    if unsaved > 0 {
        bail!("{} of {} results could not be saved", unsaved, outcomes.len());
    }
    Ok(())
}

/// Service administration through the backend.
fn services(settings: &Settings, action: &ServicesCommand) -> Result<()> {
    let gateway = build_gateway(settings)?;
    let rt = tokio::runtime::Runtime::new()?;

    match action {
        ServicesCommand::List => {
            let services = rt.block_on(gateway.list_services())?;
            if services.is_empty() {
                println!("No services registered.");
            }
            for s in services {
                println!("{}  {:<24} {:>6}ms  {}", s.id, s.name, s.threshold_ms, s.url);
            }
        }
        ServicesCommand::Add {
            name,
            url,
            threshold_ms,
        } => {
            let mut input = ServiceInput::new(name.as_str(), url.as_str());
            if let Some(threshold) = threshold_ms {
                input = input.threshold_ms(*threshold);
            }
            let new_service = input.validate()?;
            let created = rt.block_on(gateway.create_service(&new_service))?;
            println!("Added {} ({})", created.name, created.id);
        }
        ServicesCommand::Update {
            id,
            name,
            url,
            threshold_ms,
        } => {
            let update =
                ServiceUpdate::from_parts(name.as_deref(), url.as_deref(), *threshold_ms)?;
            let updated = rt.block_on(gateway.update_service(&ServiceId::new(id.as_str()), &update))?;
            println!("Updated {} ({})", updated.name, updated.id);
        }
        ServicesCommand::Remove { id } => {
            let removed = rt.block_on(gateway.delete_service(&ServiceId::new(id.as_str())))?;
            println!("Removed {} ({})", removed.name, removed.id);
        }
    }
    Ok(())
}
