use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Context;
use log::LevelFilter;
use viewer_core::{update, Msg, PollingState, StreamState, TerminationState, ViewState};
use viewer_engine::{ClientSettings, EngineHandle, PageConfig};
use viewer_logging::{viewer_info, LogDestination};

use crate::effects::EffectRunner;
use crate::input::{self, UserInput};
use crate::render;

const DEFAULT_CONFIG: &str = "session_page.ron";
const TICK: Duration = Duration::from_millis(50);

pub fn run_app() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    let page = PageConfig::load(&config_path);
    let destination = page
        .as_ref()
        .map(|page| LogDestination::from(page.log_destination))
        .unwrap_or_default();
    viewer_logging::initialize(destination, LevelFilter::Info);

    let resolved = page.and_then(|page| {
        let endpoints = page.resolve()?;
        Ok((page, endpoints))
    });
    let (page, endpoints) = match resolved {
        Ok(resolved) => resolved,
        Err(err) => {
            // Nothing starts: show the halted view and exit.
            let (state, _) = update(ViewState::new(), Msg::ConfigInvalid(err.to_string()));
            render::print(&state.view());
            return Err(err).with_context(|| format!("loading {}", config_path.display()));
        }
    };
    viewer_info!(
        "Session {} status={} stream={}",
        endpoints.session_id,
        endpoints.status_url,
        endpoints.stream_url
    );

    let engine =
        EngineHandle::new(endpoints, ClientSettings::default()).context("starting engine")?;
    let (input_tx, input_rx) = mpsc::channel();
    input::spawn_stdin_reader(input_tx);

    let mut app = App::new(
        EffectRunner::new(engine),
        ViewState::new().with_datalayer_limit(page.datalayer_limit),
    );
    app.run(&input_rx);
    Ok(())
}

/// Sole owner of the view state; every message goes through `update` here.
struct App {
    runner: EffectRunner,
    state: ViewState,
}

impl App {
    fn new(runner: EffectRunner, state: ViewState) -> Self {
        Self { runner, state }
    }

    fn run(&mut self, input_rx: &mpsc::Receiver<UserInput>) {
        render::print(&self.state.view());
        self.runner.start();

        loop {
            if let Some(msg) = self.runner.next_msg(TICK) {
                self.dispatch_msg(msg);
            }
            while let Ok(input) = input_rx.try_recv() {
                match input {
                    UserInput::Finish => self.dispatch_msg(Msg::FinishClicked),
                    UserInput::Quit => {
                        viewer_info!("Quit requested");
                        self.runner.shutdown();
                        return;
                    }
                }
            }
            if is_settled(&self.state) {
                viewer_info!("Polling stopped and event stream closed; exiting");
                self.runner.shutdown();
                return;
            }
        }
    }

    fn dispatch_msg(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            render::print(&state.view());
        }
        self.state = state;
        self.runner.enqueue(effects);
    }
}

/// Neither channel can produce anything new and no finish request is still
/// waiting for its answer.
fn is_settled(state: &ViewState) -> bool {
    state.polling() == PollingState::Stopped
        && matches!(
            state.stream(),
            StreamState::Closed { .. } | StreamState::Failed
        )
        && !matches!(state.termination(), TerminationState::Pending)
}
