use anyhow::Context as _;
use clap::{Parser, Subcommand};
use nexus_gateway::{ContentService, GatewayConfig};
use nexus_schema::{
    resolve_global_settings, resolve_story, FallbackPolicy, Resolved, SchemaError,
    ValidationError,
};
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nexus")]
#[command(about = "NexusBio CMS content CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a story (or global settings) JSON file
    Validate {
        /// Path to the JSON file, as exported from the Content Delivery API
        file: PathBuf,
        /// Treat the file as global settings instead of a page story
        #[arg(long)]
        settings: bool,
        /// Fail on any field violation instead of reporting a fallback
        #[arg(long)]
        strict: bool,
    },
    /// Fetch and validate one story from the CMS
    Fetch {
        /// Full slug of the story
        slug: String,
        /// Fetch the draft revision
        #[arg(long)]
        draft: bool,
    },
    /// Fetch and validate the global settings
    Settings {
        /// Fetch the draft revision
        #[arg(long)]
        draft: bool,
    },
    /// List published page stories
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("nexus=error".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Validate {
            file,
            settings,
            strict,
        }) => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let raw: Value = serde_json::from_str(&text)
                .with_context(|| format!("{} is not valid JSON", file.display()))?;
            let policy = if strict {
                FallbackPolicy::Strict
            } else {
                FallbackPolicy::Lenient
            };

            let outcome = if settings {
                resolve_global_settings(settings_content(&raw), policy).map(|r| r.map(|_| ()))
            } else {
                resolve_story(story_payload(&raw), policy).map(|r| r.map(|_| ()))
            };

            match outcome {
                Ok(Resolved::Valid(())) => println!("{}: valid", file.display()),
                Ok(Resolved::Fallback { errors, .. }) => {
                    println!(
                        "{}: {} violation(s), would be served as raw fallback",
                        file.display(),
                        errors.len()
                    );
                    print_errors(errors.as_slice());
                }
                Err(SchemaError::Rejected(errors)) => {
                    print_errors(errors.as_slice());
                    anyhow::bail!("{}: rejected with {} violation(s)", file.display(), errors.len());
                }
                Err(e) => anyhow::bail!("{}: {}", file.display(), e),
            }
        }
        Some(Commands::Fetch { slug, draft }) => {
            let service = content_service()?;
            let story = service.fetch_story(&slug, draft).await?;
            print_resolved(&story)?;
        }
        Some(Commands::Settings { draft }) => {
            let service = content_service()?;
            match service.fetch_global_settings(draft).await {
                Some(settings) => print_resolved(&settings)?,
                None => anyhow::bail!("global settings are unavailable"),
            }
        }
        Some(Commands::List) => {
            let service = content_service()?;
            let stories = service.list_page_stories().await?;
            if stories.is_empty() {
                println!("No stories found.");
            } else {
                for story in stories {
                    let published = story
                        .published_at
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "never".into());
                    println!(
                        "ID: {}, Slug: {}, Name: {}, Published: {}",
                        story.id, story.full_slug, story.name, published
                    );
                }
            }
        }
        None => {
            println!("Use 'nexus --help' for commands");
        }
    }

    Ok(())
}

fn content_service() -> anyhow::Result<ContentService> {
    let cfg = GatewayConfig::from_env()?;
    Ok(ContentService::from_config(&cfg)?)
}

/// Accepts either a Content Delivery API response (`{"story": {...}}`) or the bare story.
fn story_payload(raw: &Value) -> &Value {
    raw.get("story").unwrap_or(raw)
}

/// Accepts an API response, a settings story, or the bare settings content.
fn settings_content(raw: &Value) -> &Value {
    let story = story_payload(raw);
    story.get("content").unwrap_or(story)
}

fn print_errors(errors: &[ValidationError]) {
    for error in errors {
        println!("  {error}");
    }
}

fn print_resolved<T: serde::Serialize>(resolved: &Resolved<T>) -> anyhow::Result<()> {
    if !resolved.is_valid() {
        eprintln!("{} violation(s); showing raw content:", resolved.errors().len());
        for error in resolved.errors() {
            eprintln!("  {error}");
        }
    }
    println!("{}", serde_json::to_string_pretty(&resolved.to_json()?)?);
    Ok(())
}
