//! src/main.rs
//! Terminal navigator for hierarchical data-collection files

use std::{
    io::{self, Stdout},
    panic::PanicHookInfo,
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, error, info, warn};

use h5nav_core::{
    config::Config,
    controller::{Action, EventLoop, Navigator, NavigatorEvent},
    fs::JsonOpener,
    init_logging_with_config,
    view::{UIRenderer, theme},
};

type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Browse groups, datasets and attributes of container files.
#[derive(Debug, Parser)]
#[command(name = "h5nav", version, about)]
struct Cli {
    /// Container files to open, one tab each.
    files: Vec<PathBuf>,

    /// Config file to use instead of the platform default.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level directive, e.g. `debug` or `h5nav_core=trace`.
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path).await,
        None => Config::load().await,
    }
    .context("Failed to load configuration")?;

    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }

    let _guard = init_logging_with_config(config.logging.clone()).context("Failed to initialize logging")?;
    info!(files = cli.files.len(), "Starting h5nav");

    setup_panic_handler();

    let app = App::new(config, cli.files).context("Failed to initialize application")?;
    app.run().await.context("Application runtime error")?;

    info!("Application exited cleanly");
    Ok(())
}

struct App {
    terminal: AppTerminal,
    event_loop: EventLoop,
    navigator: Navigator,
    ui_renderer: UIRenderer,
}

impl App {
    fn new(config: Config, files: Vec<PathBuf>) -> Result<Self> {
        let (mut navigator, task_rx) = Navigator::new(config, Arc::new(JsonOpener));

        for file in files {
            navigator.open_collection(file);
        }

        theme::init_theme();
        let terminal = setup_terminal().context("Failed to initialize terminal")?;

        Ok(Self {
            terminal,
            event_loop: EventLoop::new(task_rx),
            navigator,
            ui_renderer: UIRenderer::new(),
        })
    }

    async fn run(mut self) -> Result<()> {
        let result = self.event_loop_body().await;

        if let Err(e) = cleanup_terminal(&mut self.terminal) {
            warn!(error = %e, "Terminal cleanup failed");
        }

        result
    }

    async fn event_loop_body(&mut self) -> Result<()> {
        loop {
            self.render()?;

            let Some(action) = self.event_loop.next_action(self.navigator.input_mode()).await else {
                break;
            };

            if !self.handle(action) {
                info!("Quit requested");
                break;
            }

            // Apply whatever else finished meanwhile before drawing again.
            while let Some(result) = self.event_loop.try_next_task() {
                self.navigator.apply_task_result(result);
            }

            self.log_events();
        }

        Ok(())
    }

    /// Mouse cells only make sense against the last drawn layout.
    fn handle(&mut self, action: Action) -> bool {
        let action = match action {
            Action::MouseMove { column, row } => Action::HoverRow(self.ui_renderer.row_at(column, row)),
            Action::MouseClick { column, row } => self
                .ui_renderer
                .row_at(column, row)
                .map_or(Action::NoOp, Action::ClickRow),
            other => other,
        };

        self.navigator.dispatch(action)
    }

    fn log_events(&mut self) {
        for event in self.navigator.drain_events() {
            match event {
                NavigatorEvent::SelectionChanged { uid, path } => {
                    debug!(uid = %uid, path = %path, "selectionChanged");
                }
                NavigatorEvent::ResultsChanged(results) => {
                    debug!(revision = results.revision, matches = results.len(), "resultsChanged");
                }
                NavigatorEvent::CollectionOpened { uid, path } => {
                    info!(uid = %uid, path = %path.display(), "collectionOpened");
                }
                NavigatorEvent::CollectionClosed(uid) => info!(uid = %uid, "collectionClosed"),
                NavigatorEvent::ChildrenLoaded { uid, path } => {
                    debug!(uid = %uid, path = %path, "childrenLoaded");
                }
            }
        }
    }

    fn render(&mut self) -> Result<()> {
        let snapshot = self.navigator.snapshot();
        let renderer = &mut self.ui_renderer;

        self.terminal
            .draw(|frame| renderer.render(frame, &snapshot))
            .context("Failed to draw frame")?;

        Ok(())
    }
}

fn setup_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    info!("Terminal setup complete");
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    info!("Terminal cleanup complete");
    Ok(())
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
