use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use storyform::url::resolve_page_url;
use storyform::{EditMode, EditorError, HttpGateway, StoryEditor, StoryState, SyncConfig, SyncOutcome};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("story file {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid story JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("missing page URL; pass --page-url, or --section and --title (or set them in the story file)")]
    MissingPageUrl,
    #[error("sync did not complete: {0:?}")]
    SyncIncomplete(SyncOutcome),
}

#[derive(Parser, Debug)]
#[command(name = "storyform", about = "Edit the component list of a data story")]
struct Cli {
    /// Story editing page, e.g. http://127.0.0.1:5000/modify/<section>/<story>
    #[arg(long, env = "STORYFORM_PAGE_URL")]
    page_url: Option<String>,

    /// Story server used to build the page URL when --page-url is absent.
    #[arg(long, env = "STORYFORM_BASE_URL", default_value = "http://127.0.0.1:5000")]
    base_url: String,

    /// Section name; defaults to the story file's `section_name`.
    #[arg(long)]
    section: Option<String>,

    /// Story title; defaults to the story file's `title`.
    #[arg(long)]
    title: Option<String>,

    /// Story JSON the page was rendered with; updated after each sync.
    #[arg(long, env = "STORYFORM_STORY_FILE")]
    story: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the component list.
    Show,
    /// Print the components that can be added.
    Palette,
    /// Append a component.
    Add { type_name: String },
    /// Remove the component at INDEX.
    Remove { index: usize },
    /// Move the component at INDEX up one slot.
    Up { index: usize },
    /// Move the component at INDEX down one slot.
    Down { index: usize },
    /// Save field edits without changing structure.
    Sync,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let story = read_story(&cli.story)?;
    let page_url = resolve_page_url(
        cli.page_url.as_deref(),
        &cli.base_url,
        cli.section.as_deref().or(story.section_name.as_deref()),
        cli.title.as_deref().or(story.title.as_deref()),
    )
    .ok_or(CliError::MissingPageUrl)?;
    let mode = EditMode::from_page_url(&page_url);
    let gateway = HttpGateway::new(&page_url, SyncConfig::from_env())?;
    tracing::debug!(url = gateway.url(), ?mode, "story gateway configured");
    let mut editor = StoryEditor::new(story, mode, gateway);

    let outcome = match cli.command {
        Command::Show => {
            for d in editor.list().as_slice() {
                println!("{}\t{}", d.position, d.kind);
            }
            return Ok(());
        }
        Command::Palette => {
            for entry in editor.palette() {
                println!("{}", entry.button_label());
            }
            return Ok(());
        }
        Command::Add { type_name } => editor.add(&type_name).await?,
        Command::Remove { index } => editor.remove(index).await?,
        Command::Up { index } => editor.move_up(index).await?,
        Command::Down { index } => editor.move_down(index).await?,
        Command::Sync => editor.pointer_leave().await,
    };

    write_story(&cli.story, editor.story())?;
    println!("{}", serde_json::to_string_pretty(editor.story())?);

    match outcome {
        SyncOutcome::Synced | SyncOutcome::Skipped => Ok(()),
        other => Err(CliError::SyncIncomplete(other)),
    }
}

fn read_story(path: &Path) -> Result<StoryState, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io { path: path.to_path_buf(), source })?;
    Ok(serde_json::from_str(&text)?)
}

fn write_story(path: &Path, story: &StoryState) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(story)?;
    std::fs::write(path, text).map_err(|source| CliError::Io { path: path.to_path_buf(), source })
}
