use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use engine_logging::{engine_info, engine_warn};
use tokenscope_core::{update, AppState, Msg, RenderOptions};
use tokenscope_engine::{merge_double_spaces, EngineSettings};

use super::effects::EffectRunner;
use super::input::{self, Command};
use super::{logging, ui};

/// Everything the main loop reacts to.
pub enum AppEvent {
    Msg(Msg),
    Line(String),
    InputClosed,
}

pub fn run_app() -> anyhow::Result<()> {
    logging::initialize()?;

    let settings = EngineSettings::from_env();
    let render_options = RenderOptions {
        merge_double_spaces: merge_double_spaces(|key| std::env::var(key).ok())?,
    };
    let currency = settings.exchange.currency.clone();
    engine_info!("Token-count server: {}", settings.client.server_url);

    let (tx, rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(settings, tx.clone()).context("starting IO engine")?;
    spawn_stdin_reader(tx);

    let mut app = App {
        state: AppState::new()
            .with_render_options(render_options)
            .with_currency(&currency),
        runner,
        stdout: io::stdout(),
    };
    app.draw()?;
    app.dispatch(Msg::Started)?;

    while let Ok(event) = rx.recv() {
        match event {
            AppEvent::Msg(msg) => app.dispatch(msg)?,
            AppEvent::Line(line) => match input::parse_line(&line) {
                Command::Quit => break,
                Command::Help => app.print(input::HELP)?,
                Command::Unknown(raw) => {
                    app.print(&format!("Unknown command `{raw}`. Type :help."))?;
                }
                command => match input::to_msg(command, &app.state) {
                    Ok(Some(msg)) => app.dispatch(msg)?,
                    Ok(None) => {}
                    Err(err) => app.print(&err.to_string())?,
                },
            },
            AppEvent::InputClosed => break,
        }
    }

    engine_info!("Exiting after {} requests", app.state.log().len());
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
    stdout: io::Stdout,
}

impl App {
    fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);

        if was_dirty {
            self.draw()?;
        }
        Ok(())
    }

    fn draw(&mut self) -> io::Result<()> {
        let lines = ui::render::render(&self.state.view());
        let mut out = self.stdout.lock();
        for line in lines {
            writeln!(out, "{line}")?;
        }
        write!(out, "> ")?;
        out.flush()
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        let mut out = self.stdout.lock();
        writeln!(out, "{text}")?;
        write!(out, "> ")?;
        out.flush()
    }
}

fn spawn_stdin_reader(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(AppEvent::Line(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    engine_warn!("Reading stdin failed: {}", err);
                    break;
                }
            }
        }
        let _ = tx.send(AppEvent::InputClosed);
    });
}
