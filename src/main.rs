use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use taskvox::voice::{
    AudioPlayback, AudioSource, MicCapture, OpenAiTts, WhisperStt, input_device_available,
};
use taskvox::{
    CommandHandler, Config, JsonFileStore, Navigation, Priority, SessionState, StateStore,
    TASKS_KEY, TaskDraft, TaskFilter, TaskStore, VoiceSession,
};

/// taskvox - voice-controlled personal task manager
#[derive(Parser)]
#[command(name = "taskvox", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Listen for voice commands
    Listen {
        /// Stop after one command instead of looping
        #[arg(long)]
        once: bool,
    },
    /// Run a typed utterance through the command pipeline (no audio)
    Say {
        /// The utterance, e.g. "add task buy groceries"
        text: String,
    },
    /// Add a task
    Add {
        /// Task title
        title: String,
        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
        /// Priority (high, medium, low)
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// List tasks
    List {
        /// Filter by title substring
        #[arg(short, long)]
        search: Option<String>,
        /// Filter by priority (high, medium, low)
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// Mark a task completed (or pending again)
    Complete {
        /// Task id (see `list`)
        id: u64,
    },
    /// Delete a task
    Delete {
        /// Task id (see `list`)
        id: u64,
    },
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,taskvox=info",
        1 => "info,taskvox=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load();
    let mut store = open_store(&config)?;

    match cli.command {
        Command::Listen { once } => listen(config, store, once).await,
        Command::Say { text } => {
            let mut handler = CommandHandler::new(store);
            let outcome = handler.handle(&text);
            if !outcome.response.is_empty() {
                println!("{}", outcome.response);
            }
            render_navigation(outcome.navigation, handler.store());
            Ok(())
        }
        Command::Add {
            title,
            description,
            priority,
            due,
        } => {
            let due_date = due
                .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
                .transpose()
                .map_err(|e| anyhow::anyhow!("invalid due date: {e}"))?;
            let task = store.add(TaskDraft {
                title,
                description,
                priority,
                due_date,
            })?;
            println!("Added task {} ({})", task.id, task.title);
            Ok(())
        }
        Command::List { search, priority } => {
            print_tasks(&store.list(&TaskFilter { search, priority }));
            Ok(())
        }
        Command::Complete { id } => {
            let task = store.toggle_status(id)?;
            println!("Task {} is now {}", task.id, task.status);
            Ok(())
        }
        Command::Delete { id } => {
            store.delete(id)?;
            println!("Deleted task {id}");
            Ok(())
        }
        Command::TestMic { duration } => test_mic(duration).await,
    }
}

/// Open the persisted task store, seeding starter tasks on first run
///
/// A store the user has emptied is not reseeded; only the absence of
/// any persisted state counts as a first run.
fn open_store(config: &Config) -> anyhow::Result<TaskStore> {
    let persist = JsonFileStore::new(&config.data_dir)?;
    let first_run = persist.load(TASKS_KEY)?.is_none();
    let mut store = TaskStore::with_persistence(Box::new(persist))?;
    if first_run {
        store.seed_defaults()?;
    }
    Ok(store)
}

/// Run voice listening cycles until interrupted
#[allow(clippy::future_not_send)]
async fn listen(config: Config, store: TaskStore, once: bool) -> anyhow::Result<()> {
    if !config.voice.enabled {
        anyhow::bail!("voice is disabled (TASKVOX_DISABLE_VOICE)");
    }
    let api_key = config
        .voice
        .openai_api_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY required for voice commands"))?;

    let transcriber = WhisperStt::new(api_key.clone(), config.voice.stt_model.clone())?;
    let synthesizer = OpenAiTts::new(
        api_key,
        config.voice.tts_voice.clone(),
        config.voice.tts_model.clone(),
        config.voice.speech,
    )?;
    let playback = AudioPlayback::new(config.voice.speech.volume)?;

    let mut session = VoiceSession::new(
        CommandHandler::new(store),
        Box::new(MicCapture::new()),
        Box::new(playback),
        Box::new(transcriber),
        Box::new(synthesizer),
    );

    // Ctrl-C cancels the in-flight listening cycle and stops the loop
    let (cancel_tx, mut cancel_rx) = mpsc::channel(1);
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                stop.store(true, Ordering::SeqCst);
                if cancel_tx.send(()).await.is_err() {
                    break;
                }
            }
        });
    }

    println!("Listening for commands. Say \"help\" for examples, Ctrl-C to stop.");

    loop {
        let outcome = session.listen_once(&mut cancel_rx).await?;

        if let Some(outcome) = outcome {
            if !outcome.response.is_empty() {
                println!("{}", outcome.response);
            }
            render_navigation(outcome.navigation, session.handler().store());
        } else if let SessionState::Error(message) = session.state() {
            eprintln!("{message}");
            // No microphone means the voice entry point stays unusable
            if !input_device_available() {
                break;
            }
        }

        if once || stop.load(Ordering::SeqCst) {
            break;
        }
    }

    Ok(())
}

/// Act on a navigation signal the way the rendering layer would
fn render_navigation(navigation: Option<Navigation>, store: &TaskStore) {
    match navigation {
        Some(Navigation::Home) => print_tasks(&store.list(&TaskFilter::default())),
        Some(Navigation::Create) => {
            println!("(say \"add task <title>\" or run `taskvox add <title>`)");
        }
        None => {}
    }
}

fn print_tasks(tasks: &[taskvox::Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    for task in tasks {
        let done = match task.status {
            taskvox::Status::Completed => "x",
            taskvox::Status::Pending => " ",
        };
        let due = task
            .due_date
            .map_or_else(String::new, |d| format!("  due {d}"));
        let priority = task.priority.to_string();
        println!("[{done}] #{:<4} {priority:<8} {}{due}", task.id, task.title);
    }
}

/// Test microphone input with a level meter
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = MicCapture::new();
    capture.start()?;

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.take_chunk();
        let energy = rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!("[{:2}s] RMS: {energy:.4} | Peak: {peak:.4} | [{meter}]", i + 1);
    }

    capture.stop();

    println!("\nIf you saw movement in the meter, your mic is working.");
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
