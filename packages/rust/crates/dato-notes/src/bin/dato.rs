#![allow(missing_docs)]

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use dato_notes::{
    NewNoteRequest, NoteFilter, NoteStore, SiteConfig, load_site_config, render_markdown,
    rss_feed, sitemap, validate_notes_dir, write_note,
};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const NEW_NOTE_BODY: &str = "Write your note here.";

#[derive(Parser, Debug)]
#[command(
    name = "dato",
    about = "Dato notes CLI: list, inspect, validate and author Zettelkasten notes",
    arg_required_else_help = true
)]
struct Cli {
    /// Notes directory (overrides config and `DATO_NOTES_DIR`).
    #[arg(long, short = 'd', value_name = "DIR", global = true)]
    notes_dir: Option<PathBuf>,

    /// Explicit config file (defaults to `./dato.yaml` when present).
    #[arg(long = "conf", short = 'c', value_name = "FILE", global = true)]
    config_file: Option<PathBuf>,

    /// Output format.
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Json, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List note summaries in display order.
    List {
        /// Only notes with a dedicated page.
        #[arg(long, default_value_t = false)]
        long_form: bool,
        /// Case-insensitive text filter.
        #[arg(long, short = 'q')]
        query: Option<String>,
        /// Case-insensitive tag filter.
        #[arg(long, short = 't')]
        tag: Option<String>,
    },
    /// Show one full note with links and backlinks.
    Show { slug: String },
    /// Tag frequencies.
    Tags,
    /// Lowercase title/slug to slug map.
    SlugMap,
    /// Index counters and skipped files.
    Stats,
    /// Validate every note; exits non-zero on failure.
    Validate,
    /// Create a new note file from a template.
    New {
        /// Title words.
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
        #[arg(long = "type", default_value = "idea")]
        note_type: String,
        /// Comma separated tags.
        #[arg(long)]
        tags: Option<String>,
        #[arg(long, default_value = "seed")]
        status: String,
        /// `YYYY-MM-DD`, defaults to today.
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        slug: Option<String>,
    },
    /// Render a note body to HTML.
    Render { slug: String },
    /// Print the RSS feed.
    Rss,
    /// Print the sitemap.
    Sitemap,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

fn emit<T: Serialize>(value: &T, output: OutputFormat) -> Result<()> {
    let rendered = match output {
        OutputFormat::Json => serde_json::to_string(value),
        OutputFormat::Pretty => serde_json::to_string_pretty(value),
    }
    .context("failed to serialize CLI output as JSON")?;
    println!("{rendered}");
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<SiteConfig> {
    let mut config =
        load_site_config(cli.config_file.as_deref()).context("failed to load site config")?;
    if let Some(dir) = &cli.notes_dir {
        config.notes_dir.clone_from(dir);
    }
    Ok(config)
}

fn execute(cli: &Cli, config: &SiteConfig) -> Result<()> {
    let store = NoteStore::from_config(config);
    match &cli.command {
        Command::List {
            long_form,
            query,
            tag,
        } => {
            let filter = NoteFilter {
                query: query.clone(),
                tag: tag.clone(),
                long_form_only: *long_form,
            };
            let rows = store
                .search_summaries(&filter)
                .context("failed to list notes")?;
            emit(&rows, cli.output)
        }
        Command::Show { slug } => {
            let Some(note) = store.note_by_slug(slug).context("failed to load notes")? else {
                bail!("note '{slug}' not found");
            };
            emit(&note, cli.output)
        }
        Command::Tags => emit(&store.tag_counts()?, cli.output),
        Command::SlugMap => emit(&store.slug_map()?, cli.output),
        Command::Stats => {
            let index = store.snapshot().context("failed to build note index")?;
            emit(
                &json!({
                    "notes_dir": config.notes_dir,
                    "stats": index.stats(),
                    "issues": index.issues(),
                }),
                cli.output,
            )
        }
        Command::Validate => {
            let report =
                validate_notes_dir(&config.notes_dir).context("failed to validate notes")?;
            match cli.output {
                OutputFormat::Json => emit(&report, cli.output)?,
                OutputFormat::Pretty => println!("{report}"),
            }
            if !report.is_ok() {
                bail!("{} validation error(s)", report.errors.len());
            }
            Ok(())
        }
        Command::New {
            title,
            note_type,
            tags,
            status,
            date,
            slug,
        } => {
            let request = NewNoteRequest {
                title: title.join(" "),
                slug: slug.clone(),
                body: NEW_NOTE_BODY.to_string(),
                tags: tags.iter().cloned().collect(),
                date: date.clone(),
                note_type: Some(note_type.clone()),
                status: Some(status.clone()),
                excerpt_placeholder: true,
            };
            let note = request
                .normalize(Local::now().date_naive())
                .context("invalid note")?;
            let path = write_note(&config.notes_dir, &note).context("failed to create note")?;
            emit(
                &json!({ "ok": true, "slug": note.slug, "file": path }),
                cli.output,
            )
        }
        Command::Render { slug } => {
            let index = store.snapshot().context("failed to build note index")?;
            let Some(note) = index.note(slug) else {
                bail!("note '{slug}' not found");
            };
            let rendered = render_markdown(&note.content, index.slug_map());
            emit(&json!({ "slug": note.slug, "html": rendered.html }), cli.output)
        }
        Command::Rss => {
            let summaries = store.long_form_note_summaries()?;
            print!("{}", rss_feed(&summaries, &config.feed_options()));
            Ok(())
        }
        Command::Sitemap => {
            let summaries = store.all_note_summaries()?;
            print!("{}", sitemap(&summaries, &config.site_url));
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dato_notes=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = resolve_config(&cli)?;
    execute(&cli, &config)
}
