//! Interactive session loop.
//!
//! One task multiplexes clock ticks, stdin lines and advisory replies with
//! `tokio::select!`, so every core call runs to completion before the next
//! one starts. Nothing in the loop waits on the user: an open unlock prompt
//! is state, answered by whichever line comes in next, and ticks keep
//! flowing meanwhile.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use focusquest_core::integrations::{
    advise_or_fallback, Advisor, FixedAnswer, GeminiAdvisor, Notifier, FAILED_ADVICE_FALLBACK,
};
use focusquest_core::{Config, CoreError, Event, FocusApp, Selection, SessionMode, Theme, Ticker};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Args)]
pub struct RunArgs {
    /// Print every core event as JSON
    #[arg(long)]
    pub events: bool,
}

/// Commands understood by the interactive loop.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Focus(Option<u32>),
    Break(Option<u32>),
    Test,
    Start,
    Pause,
    Reset,
    Add(String),
    /// 1-based, as shown by `tasks`.
    Toggle(usize),
    Tasks,
    Stats,
    Status,
    Themes,
    Theme(String),
    Hide,
    Advise,
    Help,
    Quit,
}

const HELP: &str = "\
commands:
  focus [min]    start a focus session
  break [min]    start a break
  test           run a 5 second test cycle
  start | pause | reset
  add <text>     add a task
  toggle <n>     mark task n done / pending
  tasks | stats | status | themes
  theme <id>     apply or unlock a theme
  hide           simulate leaving the window
  advise         ask for an advisory message
  quit";

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let minutes = |rest: &str| -> Result<Option<u32>, String> {
        if rest.is_empty() {
            return Ok(None);
        }
        rest.parse::<u32>()
            .map(Some)
            .map_err(|_| format!("not a number of minutes: {rest}"))
    };

    match head.to_ascii_lowercase().as_str() {
        "focus" => Ok(Command::Focus(minutes(rest)?)),
        "break" => Ok(Command::Break(minutes(rest)?)),
        "test" => Ok(Command::Test),
        "start" | "resume" => Ok(Command::Start),
        "pause" => Ok(Command::Pause),
        "reset" => Ok(Command::Reset),
        "add" if !rest.is_empty() => Ok(Command::Add(rest.to_string())),
        "add" => Err("usage: add <text>".into()),
        "toggle" => rest
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1)
            .map(Command::Toggle)
            .ok_or_else(|| "usage: toggle <n> (n starts at 1)".to_string()),
        "tasks" => Ok(Command::Tasks),
        "stats" => Ok(Command::Stats),
        "status" => Ok(Command::Status),
        "themes" => Ok(Command::Themes),
        "theme" if !rest.is_empty() => Ok(Command::Theme(rest.to_ascii_lowercase())),
        "theme" => Err("usage: theme <id>".into()),
        "hide" => Ok(Command::Hide),
        "advise" => Ok(Command::Advise),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "" => Err(String::new()),
        other => Err(format!("unknown command: {other} (try `help`)")),
    }
}

/// What the loop does after a command.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    /// A countdown started or resumed; its first second starts now.
    Rephase,
    Quit,
}

/// Prints announcements to stdout.
struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, message: &str) {
        println!(">> {message}");
    }

    fn theme_applied(&self, theme: &Theme) {
        let c = theme.colors;
        println!(
            "palette {}: background {} text {} panel {} accent {}",
            theme.name, c.background, c.text, c.panel, c.accent
        );
    }
}

fn is_yes(reply: &str) -> bool {
    matches!(reply.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

struct Session {
    app: FocusApp<StdoutNotifier>,
    advisor: Option<Arc<dyn Advisor>>,
    advisory_enabled: bool,
    advisory_timeout: Duration,
    advice_tx: mpsc::UnboundedSender<String>,
    print_events: bool,
    /// Theme id whose unlock prompt is waiting for a reply.
    pending_unlock: Option<String>,
}

impl Session {
    fn emit(&self, events: &[Event]) {
        if !self.print_events {
            return;
        }
        for event in events {
            if let Ok(json) = serde_json::to_string(event) {
                println!("{json}");
            }
        }
    }

    /// Fire an advisory request in the background. The reply arrives on
    /// the loop's channel whenever it is ready.
    fn request_advice(&self, explicit: bool) {
        if !self.advisory_enabled {
            if explicit {
                println!("advisory messages are disabled (config set advisory.enabled true)");
            }
            return;
        }
        let Some(advisor) = self.advisor.clone() else {
            let _ = self.advice_tx.send(FAILED_ADVICE_FALLBACK.to_string());
            return;
        };
        let summary = self.app.progress_summary();
        let timeout = self.advisory_timeout;
        let tx = self.advice_tx.clone();
        tokio::spawn(async move {
            let text = advise_or_fallback(advisor.as_ref(), &summary, timeout).await;
            let _ = tx.send(text);
        });
    }

    fn report(&self, err: CoreError) {
        match err {
            CoreError::Precondition(_) => println!("!! Please add at least one task before starting the timer."),
            CoreError::InsufficientPoints { needed, available } => {
                println!("!! Not enough points! ({available}/{needed})")
            }
            other => println!("!! {other}"),
        }
    }

    fn on_tick(&mut self) {
        let events = self.app.tick_active();
        if events.is_empty() {
            return;
        }
        self.emit(&events);
        let focus_done = events
            .iter()
            .any(|e| matches!(e, Event::SessionCompleted { mode: SessionMode::Focus, .. }));
        if focus_done {
            println!("{}", self.app.break_reward_hint());
            self.request_advice(false);
        }
    }

    /// Handle one input line: the answer to an open prompt, or a command.
    fn on_line(&mut self, line: &str) -> Flow {
        if let Some(id) = self.pending_unlock.take() {
            self.apply_theme(&id, is_yes(line));
            return Flow::Continue;
        }
        match parse_command(line) {
            Ok(command) => self.on_command(command),
            Err(msg) => {
                if !msg.is_empty() {
                    println!("{msg}");
                }
                Flow::Continue
            }
        }
    }

    fn started(&self, events: &[Event]) -> Flow {
        self.emit(events);
        if events.iter().any(|e| matches!(e, Event::SessionStarted { .. })) {
            Flow::Rephase
        } else {
            Flow::Continue
        }
    }

    fn apply_theme(&mut self, id: &str, confirmed: bool) {
        match self.app.select_theme(id, &FixedAnswer(confirmed)) {
            Ok(Selection::Applied(event)) => {
                self.emit(&[event]);
                println!("theme {id} applied");
            }
            Ok(Selection::Unlocked(events)) => {
                self.emit(&events);
                println!("theme {id} unlocked and applied");
            }
            Ok(Selection::Declined) => println!("kept current theme"),
            Err(e) => self.report(e),
        }
    }

    fn on_command(&mut self, command: Command) -> Flow {
        match command {
            Command::Focus(min) => match self.app.start_focus(min) {
                Ok(events) => {
                    println!("focus {} started", self.app.clock_face());
                    println!("{}", self.app.break_reward_hint());
                    return self.started(&events);
                }
                Err(e) => self.report(e),
            },
            Command::Break(min) => match self.app.start_break(min) {
                Ok(events) => {
                    println!("break {} started", self.app.clock_face());
                    return self.started(&events);
                }
                Err(e) => self.report(e),
            },
            Command::Test => match self.app.start_test() {
                Ok(events) => {
                    println!("test {} started", self.app.clock_face());
                    return self.started(&events);
                }
                Err(e) => self.report(e),
            },
            Command::Start => match self.app.start() {
                Ok(Some(event)) => return self.started(&[event]),
                Ok(None) => println!("nothing to start"),
                Err(e) => self.report(e),
            },
            Command::Pause => {
                if let Some(event) = self.app.pause() {
                    self.emit(&[event]);
                    println!("paused at {}", self.app.clock_face());
                }
            }
            Command::Reset => {
                let event = self.app.reset();
                self.emit(&[event]);
                println!("reset to {}", self.app.clock_face());
            }
            Command::Add(text) => {
                if let Some(event) = self.app.add_task(&text) {
                    self.emit(&[event]);
                    self.request_advice(false);
                }
            }
            Command::Toggle(n) => match self.app.toggle_task(n - 1) {
                Ok(events) => {
                    self.emit(&events);
                    if let Some(task) = self.app.tasks().get(n - 1) {
                        println!("{} - {}", task.text, task.status);
                    }
                    self.request_advice(false);
                }
                Err(e) => self.report(e),
            },
            Command::Tasks => {
                if self.app.tasks().is_empty() {
                    println!("No tasks yet.");
                }
                for (i, task) in self.app.tasks().tasks().iter().enumerate() {
                    let mark = if task.is_done() { "x" } else { " " };
                    println!("{:>2}. [{mark}] {}", i + 1, task.text);
                }
            }
            Command::Stats => {
                let state = self.app.reward_state();
                println!(
                    "points {} | level {} ({} xp) | sprints {} | breaks {} | tasks {}/{}",
                    state.points,
                    state.level,
                    state.experience,
                    state.focus_sprints_completed,
                    state.break_sessions_completed,
                    self.app.tasks().done_count(),
                    self.app.tasks().len(),
                );
            }
            Command::Status => {
                let session = self.app.session();
                println!(
                    "{} {:?} {} ({:.0}%)",
                    session.mode(),
                    session.state(),
                    session.clock_face(),
                    session.progress() * 100.0
                );
            }
            Command::Themes => {
                for view in self.app.theme_views() {
                    let mark = if view.selected {
                        "*"
                    } else if view.unlocked {
                        " "
                    } else {
                        "#"
                    };
                    println!("{mark} {:<9} {}", view.id, view.tooltip);
                }
            }
            Command::Theme(id) => {
                if self.app.theme_needs_confirmation(&id) {
                    println!("{} [y/N]", self.app.themes().unlock_prompt(&id));
                    self.pending_unlock = Some(id);
                } else {
                    // Owned, unknown or unaffordable: no question is asked.
                    self.apply_theme(&id, false);
                }
            }
            Command::Hide => {
                if !self.app.on_focus_lost() {
                    println!("no focus session running");
                }
            }
            Command::Advise => self.request_advice(true),
            Command::Help => println!("{HELP}"),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(session_loop(config, args));
    // The stdin reader may still be parked on a blocking read.
    runtime.shutdown_background();
    result
}

async fn session_loop(config: Config, args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let advisor: Option<Arc<dyn Advisor>> = if config.advisory.enabled {
        match GeminiAdvisor::from_config(&config.advisory) {
            Ok(advisor) => Some(Arc::new(advisor)),
            Err(e) => {
                tracing::warn!(error = %e, "advisory service unavailable");
                None
            }
        }
    } else {
        None
    };

    let (advice_tx, mut advice_rx) = mpsc::unbounded_channel();
    let mut session = Session {
        app: FocusApp::new(&config, StdoutNotifier),
        advisor,
        advisory_enabled: config.advisory.enabled,
        advisory_timeout: Duration::from_secs(config.advisory.timeout_secs),
        advice_tx,
        print_events: args.events,
        pending_unlock: None,
    };

    println!("focusquest -- type `help` for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = Ticker::new();

    loop {
        tokio::select! {
            _ = ticker.next() => session.on_tick(),
            Some(text) = advice_rx.recv() => println!("advisor: {text}"),
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match session.on_line(&line) {
                    Flow::Continue => {}
                    Flow::Rephase => ticker.restart(),
                    Flow::Quit => break,
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minutes() {
        assert_eq!(parse_command("focus"), Ok(Command::Focus(None)));
        assert_eq!(parse_command("focus 50"), Ok(Command::Focus(Some(50))));
        assert_eq!(parse_command(" BREAK 10 "), Ok(Command::Break(Some(10))));
        assert!(parse_command("focus soon").is_err());
    }

    #[test]
    fn add_keeps_whole_text() {
        assert_eq!(
            parse_command("add write the  report"),
            Ok(Command::Add("write the  report".into()))
        );
        assert!(parse_command("add").is_err());
    }

    #[test]
    fn toggle_is_one_based() {
        assert_eq!(parse_command("toggle 1"), Ok(Command::Toggle(1)));
        assert!(parse_command("toggle 0").is_err());
        assert!(parse_command("toggle x").is_err());
    }

    #[test]
    fn theme_needs_id() {
        assert_eq!(parse_command("theme Ocean"), Ok(Command::Theme("ocean".into())));
        assert!(parse_command("theme").is_err());
    }

    fn session() -> Session {
        let (advice_tx, _) = mpsc::unbounded_channel();
        Session {
            app: FocusApp::new(&Config::default(), StdoutNotifier),
            advisor: None,
            advisory_enabled: false,
            advisory_timeout: Duration::from_secs(1),
            advice_tx,
            print_events: false,
            pending_unlock: None,
        }
    }

    #[test]
    fn starts_ask_for_rephase() {
        let mut s = session();
        assert_eq!(s.on_line("focus"), Flow::Continue);
        assert_eq!(s.on_line("test"), Flow::Rephase);
        assert_eq!(s.on_line("start"), Flow::Continue);
        assert_eq!(s.on_line("pause"), Flow::Continue);
        assert_eq!(s.on_line("start"), Flow::Rephase);
        assert_eq!(s.on_line("quit"), Flow::Quit);
    }

    #[test]
    fn unlock_prompt_is_answered_by_next_line() {
        let mut s = session();
        for line in ["add a", "add b", "toggle 1", "toggle 2"] {
            s.on_line(line);
        }
        s.on_line("theme ocean");
        assert_eq!(s.pending_unlock.as_deref(), Some("ocean"));
        assert_eq!(s.app.reward_state().points, 20);

        // The reply is not parsed as a command.
        assert_eq!(s.on_line("y"), Flow::Continue);
        assert!(s.pending_unlock.is_none());
        assert_eq!(s.app.reward_state().points, 0);
        assert_eq!(s.app.themes().selected().id, "ocean");
    }

    #[test]
    fn declined_or_unaffordable_unlock_changes_nothing() {
        let mut s = session();
        s.on_line("theme ocean");
        assert!(s.pending_unlock.is_none());

        for line in ["add a", "add b", "toggle 1", "toggle 2", "theme ocean"] {
            s.on_line(line);
        }
        s.on_line("no");
        assert_eq!(s.app.reward_state().points, 20);
        assert_eq!(s.app.themes().selected().id, "light");
    }

    #[test]
    fn yes_answers() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("theme ocean"));
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse_command("   "), Err(String::new()));
        assert!(parse_command("dance").unwrap_err().contains("unknown command"));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
    }
}
