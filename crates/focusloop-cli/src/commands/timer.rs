use std::io::Write;

use clap::Subcommand;
use focusloop_core::{Clock, Event, Status, SystemClock, Ticker, TimerEngine};
use focusloop_core::timer::DEFAULT_TICK_PERIOD;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::Workspace;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the current session (no-op while running)
    Start,
    /// Pause the running session
    Pause,
    /// Resume a paused session
    Resume,
    /// Back to the full duration of the current session
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Run the countdown in the foreground (s/p/r/x/q on stdin)
    Watch,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::open()?;
    let mut engine = workspace.load_engine();

    let event = match action {
        TimerAction::Start => engine.start(),
        TimerAction::Pause => engine.pause(),
        TimerAction::Resume => engine.resume(),
        TimerAction::Reset => engine.reset(),
        TimerAction::Status => engine.tick(engine.clock().now_ms()),
        TimerAction::Watch => {
            let result = watch(&workspace, &mut engine);
            workspace.save_engine(&engine)?;
            return result;
        }
    };
    if let Some(event) = event {
        announce(&event);
    }

    workspace.save_engine(&engine)?;
    println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    Ok(())
}

fn announce(event: &Event) {
    match event {
        Event::SessionCompleted { completed, next, .. } => {
            tracing::info!(?completed, ?next, "session completed");
            eprintln!(
                "{} finished. Up next: {}.",
                completed.display_name(),
                next.display_name()
            );
        }
        other => tracing::info!(event = ?other, "timer event"),
    }
}

fn watch(
    workspace: &Workspace,
    engine: &mut TimerEngine<SystemClock>,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch_loop(workspace, engine))
}

/// Every engine operation runs on this one task: ticks from the driver and
/// commands from stdin never interleave.
async fn watch_loop(
    workspace: &Workspace,
    engine: &mut TimerEngine<SystemClock>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ticker = Ticker::new(engine.subscribe_status(), DEFAULT_TICK_PERIOD);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    eprintln!("commands: s=start p=pause r=resume x=reset q=quit");
    render(engine)?;

    loop {
        tokio::select! {
            _ = ticker.wait() => {
                let now = engine.clock().now_ms();
                if let Some(event) = engine.tick(now) {
                    println!();
                    announce(&event);
                    workspace.save_engine(engine)?;
                }
                render(engine)?;
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => {
                        let command = line.trim();
                        if matches!(command, "q" | "quit") {
                            break;
                        }
                        apply_command(engine, command);
                        workspace.save_engine(engine)?;
                        render(engine)?;
                    }
                    None => stdin_open = false,
                }
            }
            _ = &mut ctrl_c => break,
        }

        // nothing left to drive and nobody to ask
        if !stdin_open && engine.status() != Status::Running {
            break;
        }
    }
    println!();
    Ok(())
}

fn apply_command(engine: &mut TimerEngine<SystemClock>, command: &str) {
    let event = match command {
        "s" | "start" => engine.start(),
        "p" | "pause" => engine.pause(),
        "r" | "resume" => engine.resume(),
        "x" | "reset" => engine.reset(),
        "" => None,
        other => {
            eprintln!("unknown command: {other}");
            None
        }
    };
    if let Some(event) = event {
        announce(&event);
    }
}

fn render(engine: &TimerEngine<SystemClock>) -> std::io::Result<()> {
    let display = engine.display();
    let status = match engine.status() {
        Status::Idle => "idle",
        Status::Running => "running",
        Status::Paused => "paused",
    };
    let mut out = std::io::stdout();
    write!(
        out,
        "\r{} {}  session {}/{}  [{}]   ",
        display.label, display.clock, display.session_index, display.sessions_per_cycle, status
    )?;
    out.flush()
}
