//! Command-line driver for the start page core.
//!
//! Runs every start page operation against the SQLite store in the
//! configured data directory, so the core can be used and checked without
//! a browser.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use startpage_core::model::todo::{format_timestamp, parse_local_datetime};
use startpage_core::{
    core_version, init_logging, project_panel, BackgroundMode, BookmarkNode, Confirm,
    CoreConfig, PanelEntry, Preconfirmed, SearchEngine, SharedStorage, SqliteStorage, StartPage,
    SystemClock, Timestamp, TodoDraft, DAILY_IMAGE_ARCHIVE_URL,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "startpage")]
#[command(about = "Todos, bookmarks, search and background settings of the start page", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the todo list
    #[command(subcommand)]
    Todo(TodoCommand),
    /// Manage the bookmark grid
    #[command(subcommand)]
    Bookmark(BookmarkCommand),
    /// Print where the search box would navigate for TEXT
    Search {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Show or change the search engine
    Engine {
        /// google|bing|baidu|duckduckgo|yahoo
        engine: Option<SearchEngine>,
    },
    /// Show or change the page background
    #[command(subcommand)]
    Background(BackgroundCommand),
    /// Render a browser bookmark tree (JSON export) as panel entries
    Panel { tree: PathBuf },
    /// Print the core version
    Version,
}

#[derive(Subcommand)]
enum TodoCommand {
    /// Add a todo
    Add {
        title: String,
        #[command(flatten)]
        fields: TodoFields,
    },
    /// Replace the fields of the todo at INDEX
    Edit {
        index: usize,
        title: String,
        #[command(flatten)]
        fields: TodoFields,
    },
    /// List todos, newest first
    List,
    /// Toggle completion of the todo at INDEX
    Done { index: usize },
    /// Delete the todo at INDEX
    Delete {
        index: usize,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(clap::Args)]
struct TodoFields {
    #[arg(short, long)]
    description: Option<String>,
    /// Start time, `YYYY-MM-DD HH:MM` (local)
    #[arg(short, long)]
    start: Option<String>,
    /// End time, `YYYY-MM-DD HH:MM` (local)
    #[arg(short, long)]
    end: Option<String>,
}

#[derive(Subcommand)]
enum BookmarkCommand {
    Add { name: String, url: String },
    List,
    Remove { index: usize },
}

#[derive(Subcommand)]
enum BackgroundCommand {
    Show,
    /// Picture of the day
    Daily {
        /// Saved response of the image archive endpoint to take the picture from
        #[arg(long)]
        archive: Option<PathBuf>,
    },
    /// One of the built-in pictures (preset1..preset4)
    Preset { id: Option<String> },
    Color { color: String },
    /// Picture given as URL or data URL
    Image { url: String },
    Gradient { from: String, to: String },
}

struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
            Err(_) => false,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("startpage_core version={}", core_version());
        return Ok(());
    }
    if let Commands::Panel { tree } = &cli.command {
        return print_panel(tree);
    }

    let config = CoreConfig::load()?;
    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!("failed to create data directory {}", config.data_dir.display())
    })?;
    if let Err(err) = init_logging(config.log_level, &config.log_dir) {
        eprintln!("Warning: logging disabled: {err}");
    }

    let storage: SharedStorage = Arc::new(SqliteStorage::open(config.db_path())?);
    let mut page = StartPage::open(storage, Arc::new(SystemClock), config.default_engine).await?;

    match cli.command {
        Commands::Todo(command) => run_todo(&page, command).await,
        Commands::Bookmark(command) => run_bookmark(&page, command).await,
        Commands::Search { text } => {
            match page.search(&text.join(" ")) {
                Some(target) => println!("{}", target.url()),
                None => eprintln!("Nothing to search for."),
            }
            Ok(())
        }
        Commands::Engine { engine } => {
            if let Some(engine) = engine {
                page.select_search_engine(engine).await?;
            }
            let current = page.search_engine();
            println!("{} ({})", current.name(), current.id());
            Ok(())
        }
        Commands::Background(command) => run_background(&mut page, command).await,
        Commands::Panel { .. } | Commands::Version => Ok(()),
    }
}

async fn run_todo(page: &StartPage, command: TodoCommand) -> Result<()> {
    let todos = page.todos();
    match command {
        TodoCommand::Add { title, fields } => {
            let todo = todos.save(fields.into_draft(title)?, None).await?;
            println!("Added \"{}\"", todo.title);
        }
        TodoCommand::Edit {
            index,
            title,
            fields,
        } => {
            let todo = todos.save(fields.into_draft(title)?, Some(index)).await?;
            println!("Updated #{index} \"{}\"", todo.title);
        }
        TodoCommand::List => {
            let list = todos.list().await?;
            if list.is_empty() {
                println!("No todos.");
            }
            let now = todos.now();
            for entry in &list {
                let todo = entry.todo;
                println!(
                    "#{:<3} [{:<11}] {}  ({} -> {})",
                    entry.index,
                    entry.status(now).label(),
                    todo.title,
                    format_bound(todo.start_time),
                    format_bound(todo.end_time),
                );
                if let Some(description) = &todo.description {
                    println!("      {description}");
                }
            }
        }
        TodoCommand::Done { index } => {
            let todo = todos.toggle_complete(index).await?;
            let state = if todo.completed { "completed" } else { "reopened" };
            println!("#{index} {state}");
        }
        TodoCommand::Delete { index, yes } => {
            let confirm: &dyn Confirm = if yes { &Preconfirmed } else { &StdinConfirm };
            if todos.delete(index, confirm).await? {
                println!("Deleted #{index}");
            }
        }
    }
    Ok(())
}

async fn run_bookmark(page: &StartPage, command: BookmarkCommand) -> Result<()> {
    let bookmarks = page.bookmarks();
    match command {
        BookmarkCommand::Add { name, url } => {
            let bookmark = bookmarks.add(&name, &url).await?;
            println!("Added {} -> {}", bookmark.name, bookmark.url);
        }
        BookmarkCommand::List => {
            for (index, bookmark) in bookmarks.list().await?.iter().enumerate() {
                println!("#{index:<3} {:<20} {}", bookmark.name, bookmark.url);
            }
        }
        BookmarkCommand::Remove { index } => {
            let removed = bookmarks.remove(index).await?;
            println!("Removed {}", removed.name);
        }
    }
    Ok(())
}

async fn run_background(page: &mut StartPage, command: BackgroundCommand) -> Result<()> {
    let mode = match command {
        BackgroundCommand::Show => {
            println!("{}: {}", page.background().kind(), page.background_css());
            return Ok(());
        }
        BackgroundCommand::Daily { archive } => {
            page.set_background(BackgroundMode::DailyImage { cached_url: None })
                .await?;
            match archive {
                Some(path) => {
                    let body = std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    page.apply_daily_image(&body).await?;
                }
                None => println!(
                    "Save {DAILY_IMAGE_ARCHIVE_URL} and pass it with --archive to refresh the picture."
                ),
            }
            println!("{}: {}", page.background().kind(), page.background_css());
            return Ok(());
        }
        BackgroundCommand::Preset { id: None } => BackgroundMode::first_preset(),
        BackgroundCommand::Preset { id: Some(id) } => BackgroundMode::Preset { id },
        BackgroundCommand::Color { color } => BackgroundMode::Color { color },
        BackgroundCommand::Image { url } => BackgroundMode::Image { data_url: url },
        BackgroundCommand::Gradient { from, to } => BackgroundMode::Gradient { from, to },
    };
    page.set_background(mode).await?;
    println!("{}: {}", page.background().kind(), page.background_css());
    Ok(())
}

fn print_panel(tree: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(tree)
        .with_context(|| format!("failed to read {}", tree.display()))?;
    let nodes: Vec<BookmarkNode> = serde_json::from_str(&raw)?;
    let entries = project_panel(Some(nodes.as_slice()))?;
    if entries.is_empty() {
        println!("No bookmarks.");
    }
    for entry in entries {
        match entry {
            PanelEntry::Link(link) => println!("{}  {}", link.title, link.host),
            PanelEntry::Folder { title, links } => {
                println!("[{title}]");
                for link in links {
                    println!("  {}  {}", link.title, link.host);
                }
            }
        }
    }
    Ok(())
}

impl TodoFields {
    fn into_draft(self, title: String) -> Result<TodoDraft> {
        Ok(TodoDraft {
            title,
            description: self.description,
            start_time: parse_bound(self.start.as_deref())?,
            end_time: parse_bound(self.end.as_deref())?,
        })
    }
}

fn parse_bound(input: Option<&str>) -> Result<Option<Timestamp>> {
    input
        .map(|text| {
            parse_local_datetime(text)
                .ok_or_else(|| anyhow!("invalid time `{text}`, expected YYYY-MM-DD HH:MM"))
        })
        .transpose()
}

fn format_bound(timestamp: Option<Timestamp>) -> String {
    timestamp
        .and_then(format_timestamp)
        .unwrap_or_else(|| "not set".to_string())
}
