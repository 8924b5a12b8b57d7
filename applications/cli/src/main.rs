/// derd - command-line shell for the Derd wellness app
use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use derd_cli::{App, DerdConfig};
use derd_core::{DocumentId, EntryDraft, Mood, StoryType};
use derd_sync::SaveOutcome;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "derd")]
#[command(about = "Derd journaling, feed and habit shell", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "DERD_CONFIG")]
    config: Option<PathBuf>,

    /// Act as if the device had no network connection
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write and read journal entries
    #[command(subcommand)]
    Journal(JournalCommand),

    /// Inspect the offline queue
    #[command(subcommand)]
    Queue(QueueCommand),

    /// Anonymous feed
    #[command(subcommand)]
    Feed(FeedCommand),

    /// Daily habit streak
    #[command(subcommand)]
    Habit(HabitCommand),
}

#[derive(Subcommand)]
enum JournalCommand {
    /// Save a new entry (queued when offline)
    Save {
        #[arg(short, long)]
        title: String,
        #[arg(short = 'b', long)]
        content: String,
        /// happy, calm, sad, tense or tired
        #[arg(short, long)]
        mood: Mood,
    },
    /// Replace an entry's title, content and mood
    Edit {
        id: String,
        #[arg(short, long)]
        title: String,
        #[arg(short = 'b', long)]
        content: String,
        #[arg(short, long)]
        mood: Mood,
    },
    /// List your entries, newest first
    List,
    /// Entry count and mind balance
    Stats,
}

#[derive(Subcommand)]
enum QueueCommand {
    /// Show entries waiting for a connection
    List,
    /// Upload queued entries now
    Flush,
    /// Discard every queued entry
    Clear,
}

#[derive(Subcommand)]
enum FeedCommand {
    /// Share an anonymous post
    Share {
        content: String,
        /// experience, advice or motivation
        #[arg(short = 'k', long = "kind", default_value = "experience")]
        story_type: StoryType,
    },
    /// Show the feed, newest first
    List,
    /// Toggle a positive vibe on a post
    Vibe { post_id: String },
}

#[derive(Subcommand)]
enum HabitCommand {
    /// Show the current streak
    Status,
    /// Mark today as done
    Done,
    /// Forget the streak
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "derd=info,derd_cli=info,derd_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = DerdConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if cli.offline {
        config.network.online = false;
    }
    config.validate()?;

    let app = App::open(&config)
        .await
        .with_context(|| format!("opening stores in {}", config.storage.data_dir.display()))?;

    let flushing_explicitly = matches!(cli.command, Commands::Queue(QueueCommand::Flush));
    if config.sync.flush_on_start && !flushing_explicitly {
        app.flush_pending().await;
    }

    match cli.command {
        Commands::Journal(cmd) => journal(&app, cmd).await,
        Commands::Queue(cmd) => queue(&app, cmd).await,
        Commands::Feed(cmd) => feed(&app, cmd).await,
        Commands::Habit(cmd) => habit(&app, cmd).await,
    }
}

async fn journal(app: &App, cmd: JournalCommand) -> anyhow::Result<()> {
    match cmd {
        JournalCommand::Save {
            title,
            content,
            mood,
        } => match app.journal.save(EntryDraft::new(title, content, mood)).await? {
            SaveOutcome::Committed(id) => println!("Recorded daily ({})", id),
            SaveOutcome::Queued => println!("Offline: saved locally, will sync when online"),
        },
        JournalCommand::Edit {
            id,
            title,
            content,
            mood,
        } => {
            app.journal
                .edit(&DocumentId::new(id), EntryDraft::new(title, content, mood))
                .await?;
            println!("Updated");
        }
        JournalCommand::List => {
            let entries = app.journal.watch_entries().await?.current();
            if entries.is_empty() {
                println!("No entries yet");
            }
            for entry in entries {
                println!(
                    "{} {}  {}  [{}]\n    {}",
                    entry.mood.emoji(),
                    entry.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    entry.title,
                    entry.id,
                    entry.content
                );
            }
        }
        JournalCommand::Stats => {
            let stats = app.journal.profile_stats().await?;
            println!("Journals:      {}", stats.journal_count);
            println!("Mind balance:  {}", stats.mind_balance);
        }
    }
    Ok(())
}

async fn queue(app: &App, cmd: QueueCommand) -> anyhow::Result<()> {
    let queue = app.journal.queue();
    match cmd {
        QueueCommand::List => {
            let entries = queue.entries().await?;
            println!("{} queued", entries.len());
            for entry in entries {
                println!(
                    "{} {}  {}  ({})",
                    entry.mood.emoji(),
                    entry.queued_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    entry.title,
                    entry.local_id
                );
            }
        }
        QueueCommand::Flush => {
            let summary = app.journal.flush().await?;
            println!(
                "Synced {} entries, {} still queued",
                summary.committed, summary.remaining
            );
        }
        QueueCommand::Clear => {
            queue.clear().await?;
            println!("Queue cleared");
        }
    }
    Ok(())
}

async fn feed(app: &App, cmd: FeedCommand) -> anyhow::Result<()> {
    match cmd {
        FeedCommand::Share {
            content,
            story_type,
        } => {
            let id = app.feed.share(&content, story_type).await?;
            println!("Shared ({})", id);
        }
        FeedCommand::List => {
            let posts = app.feed.watch_posts().await?.current();
            if posts.is_empty() {
                println!("The feed is quiet");
            }
            for post in posts {
                let marker = if app.feed.has_vibed(&post.id).await? {
                    "💖"
                } else {
                    "🤍"
                };
                println!(
                    "{}  {} {} Positive Vibes  [{}]\n    {}",
                    post.story_type.label(),
                    marker,
                    post.likes_count,
                    post.id,
                    post.content
                );
            }
        }
        FeedCommand::Vibe { post_id } => {
            let vibed = app.feed.toggle_vibe(&DocumentId::new(post_id)).await?;
            println!("{}", if vibed { "Vibe sent" } else { "Vibe removed" });
        }
    }
    Ok(())
}

async fn habit(app: &App, cmd: HabitCommand) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    match cmd {
        HabitCommand::Status => {
            let status = app.habit.status(today).await?;
            let done = if status.completed_today {
                "done today"
            } else {
                "not done yet today"
            };
            println!("Streak: {} days ({})", status.streak, done);
        }
        HabitCommand::Done => {
            let status = app.habit.complete(today).await?;
            println!("Streak: {} days", status.streak);
        }
        HabitCommand::Reset => {
            app.habit.reset().await?;
            println!("Streak reset");
        }
    }
    Ok(())
}
