use async_trait::async_trait;
use clap::Subcommand;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use brewguide_core::timer::TimerEvent;
use brewguide_core::{
    BrewPlan, Config, Event, Intent, OutcomeDraft, OutcomeError, OutcomeStore, Rating,
    SessionInput, SessionOutcome, Session, TasteTag, TokioCountdown,
};

use super::{emit, write_json};
use crate::plan_file::load_plan;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Walk through a plan interactively, reading commands from stdin
    ///
    /// Commands: next (n), pause (p), resume (r), restart, bg, fg, status (s),
    /// rate <1-5> [tag] [note...], retry, exit (q)
    Run {
        /// Plan file (.toml or .json)
        file: PathBuf,
    },
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Input(SessionInput),
    Status,
    Rate(OutcomeDraft),
    Retry,
    Exit,
}

impl Command {
    fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(Command::Status);
        };
        let intent = |intent: Intent| -> Result<Self, String> {
            Ok(Command::Input(SessionInput::Intent(intent)))
        };
        match head.to_ascii_lowercase().as_str() {
            "start" => intent(Intent::Start),
            "pause" | "p" => intent(Intent::Pause),
            "resume" | "r" => intent(Intent::Resume),
            "next" | "n" => intent(Intent::NextStep),
            "restart" => intent(Intent::Restart),
            "bg" | "background" => Ok(Command::Input(SessionInput::AppActivityChanged {
                is_active: false,
            })),
            "fg" | "foreground" => Ok(Command::Input(SessionInput::AppActivityChanged {
                is_active: true,
            })),
            "status" | "s" => Ok(Command::Status),
            "retry" => Ok(Command::Retry),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            "rate" => {
                let value = words
                    .next()
                    .ok_or("usage: rate <1-5> [tag] [note...]")?
                    .parse::<u8>()
                    .map_err(|e| format!("invalid rating: {e}"))?;
                let rating = Rating::new(value).map_err(|e| e.to_string())?;
                let mut draft = OutcomeDraft::new(rating);
                let rest: Vec<&str> = words.collect();
                let note_words = match rest.first().map(|w| w.parse::<TasteTag>()) {
                    Some(Ok(tag)) => {
                        draft = draft.with_tag(tag);
                        &rest[1..]
                    }
                    _ => &rest[..],
                };
                Ok(Command::Rate(draft.with_note(note_words.join(" "))))
            }
            other => Err(format!("unknown command: {other}")),
        }
    }
}

/// Writes finished outcomes as JSON lines; stdout in production.
struct JsonLineStore<W> {
    out: Mutex<W>,
    pretty: bool,
}

impl<W> JsonLineStore<W> {
    fn new(out: W, pretty: bool) -> Self {
        Self {
            out: Mutex::new(out),
            pretty,
        }
    }
}

#[derive(Serialize)]
struct OutcomeRecord<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    outcome: &'a SessionOutcome,
}

#[async_trait]
impl<W: Write + Send> OutcomeStore for JsonLineStore<W> {
    fn name(&self) -> &str {
        "json-lines"
    }

    async fn save(&self, outcome: &SessionOutcome) -> Result<(), OutcomeError> {
        let record = OutcomeRecord {
            kind: "Outcome",
            outcome,
        };
        let mut out = self.out.lock().map_err(|_| OutcomeError::SaveFailed {
            reason: "output lock poisoned".into(),
        })?;
        write_json(&mut *out, &record, self.pretty).map_err(|e| OutcomeError::SaveFailed {
            reason: e.to_string(),
        })
    }
}

/// Decides when a countdown tick is worth printing.
struct Announcer {
    every_secs: u64,
    last: Option<u64>,
}

impl Announcer {
    fn new(every_secs: u64) -> Self {
        Self {
            every_secs,
            last: None,
        }
    }

    fn due(&mut self, remaining: Option<Duration>) -> bool {
        let Some(remaining) = remaining else {
            return false;
        };
        if self.every_secs == 0 {
            return false;
        }
        let whole = remaining.as_secs();
        if whole % self.every_secs != 0 || self.last == Some(whole) {
            return false;
        }
        self.last = Some(whole);
        true
    }
}

#[derive(Serialize)]
struct Notice<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    message: &'a str,
}

enum Input {
    Line(Option<String>),
    Timer(TimerEvent),
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SessionAction::Run { file } => {
            let plan = load_plan(&file)?;
            let config = Config::load_or_default();
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(drive(plan, &config));
            // A stdin read may still be parked on its blocking thread.
            runtime.shutdown_background();
            result
        }
    }
}

async fn drive(plan: BrewPlan, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let pretty = config.display.pretty_json;
    let store = JsonLineStore::new(io::stdout(), pretty);
    let mut announcer = Announcer::new(config.display.announce_every_secs);
    let mut session = Session::new(plan, TokioCountdown::new(config.tick_interval()));
    tracing::debug!(session_id = %session.id(), tick = ?config.tick_interval(), "session run started");
    emit(&session.view(), pretty)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let input = tokio::select! {
            line = lines.next_line() => Input::Line(line?),
            Some(event) = session.next_timer_event() => Input::Timer(event),
        };

        match input {
            Input::Timer(event) => match session.handle(event.into()) {
                Some(event) => print_change(&event, &session, pretty)?,
                None => {
                    if announcer.due(session.remaining()) {
                        emit(&session.view(), pretty)?;
                    }
                }
            },
            // stdin closed: leave without saving.
            Input::Line(None) => {
                emit(&session.exit(), pretty)?;
                return Ok(());
            }
            Input::Line(Some(line)) => match Command::parse(&line) {
                Ok(Command::Exit) => {
                    emit(&session.exit(), pretty)?;
                    return Ok(());
                }
                Ok(Command::Status) => emit(&session.view(), pretty)?,
                Ok(Command::Input(input)) => match session.handle(input) {
                    Some(event) => print_change(&event, &session, pretty)?,
                    None => notice("ignored in the current phase", pretty)?,
                },
                Ok(Command::Rate(draft)) => {
                    if !session.is_complete() {
                        notice("finish the brew before rating it", pretty)?;
                        continue;
                    }
                    let result = session.save_outcome(&store, draft).await;
                    if finish_save(result, pretty)? {
                        return Ok(());
                    }
                }
                Ok(Command::Retry) => {
                    if session.pending_outcome().is_none() {
                        notice("nothing to retry", pretty)?;
                        continue;
                    }
                    let result = session.retry_save_outcome(&store).await;
                    if finish_save(result, pretty)? {
                        return Ok(());
                    }
                }
                Err(message) => notice(&message, pretty)?,
            },
        }
    }
}

fn print_change<C: brewguide_core::Countdown>(
    event: &Event,
    session: &Session<C>,
    pretty: bool,
) -> io::Result<()> {
    emit(event, pretty)?;
    emit(&session.view(), pretty)
}

fn notice(message: &str, pretty: bool) -> io::Result<()> {
    emit(
        &Notice {
            kind: "Notice",
            message,
        },
        pretty,
    )
}

/// Returns whether the session is done.
fn finish_save(result: Result<Event, OutcomeError>, pretty: bool) -> io::Result<bool> {
    match result {
        Ok(event) => {
            emit(&event, pretty)?;
            Ok(true)
        }
        Err(err) => {
            notice(&format!("{err}; type `retry` to try again"), pretty)?;
            Ok(false)
        }
    }
}
