//! Sectionkit - storefront section library manager
//!
//! Usage:
//!   sectionkit list                       # Browse the local library
//!   sectionkit install faq-1 --theme 42   # Deploy a section into a theme
//!   sectionkit upload --id hero ...       # Add a section to the library

mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dialoguer::{Confirm, theme::ColorfulTheme};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sectionkit_core::commands::{
    CategoriesInput, InstallSectionRequest, SavePreviewRequest, SectionService,
    UpdateSectionRequest, UploadSectionRequest,
};
use sectionkit_core::context::AppContext;
use sectionkit_core::library::PreviewUpload;
use sectionkit_core::library::preview::encode_data_url;

#[derive(Parser)]
#[command(name = "sectionkit")]
#[command(about = "Storefront section library manager", long_about = None)]
struct Cli {
    /// Project root holding sectionkit.toml (defaults to the current directory)
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a library section into a store theme
    Install {
        /// Section id
        section: String,
        /// Target theme id (defaults to the shop's main theme)
        #[arg(long)]
        theme: Option<u64>,
        /// Shop domain (defaults to shop.domain in sectionkit.toml)
        #[arg(long)]
        shop: Option<String>,
    },

    /// List the themes of a shop
    Themes {
        #[arg(long)]
        shop: Option<String>,
    },

    /// List library sections
    #[command(alias = "ls")]
    List,

    /// Show one section
    Show { id: String },

    /// Add a section to the library
    Upload(Box<UploadArgs>),

    /// Update an existing section
    Update(UpdateArgs),

    /// Delete a section from every library root and the preview cache
    #[command(alias = "rm")]
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Write a section's preview image to a file
    Preview {
        id: String,
        #[arg(long, short)]
        out: PathBuf,
    },

    /// Generate a placeholder preview unless one exists
    Placeholder { id: String },

    /// Store a preview image for a section
    SetPreview {
        id: String,
        /// PNG, JPEG, SVG or GIF file
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub(crate) enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[derive(Args)]
struct UploadArgs {
    /// Section id; normalized to a lowercase slug
    #[arg(long)]
    id: String,
    #[arg(long)]
    title: String,
    /// Liquid template file
    #[arg(long)]
    content_file: PathBuf,
    #[command(flatten)]
    extra: SectionFieldArgs,
}

#[derive(Args)]
struct UpdateArgs {
    id: String,
    #[arg(long)]
    title: Option<String>,
    /// Replacement Liquid template file
    #[arg(long)]
    content_file: Option<PathBuf>,
    #[command(flatten)]
    extra: SectionFieldArgs,
}

/// Optional fields shared by upload and update
#[derive(Args)]
struct SectionFieldArgs {
    #[arg(long)]
    description: Option<String>,
    /// Comma-separated categories
    #[arg(long)]
    categories: Option<String>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    style_file: Option<PathBuf>,
    #[arg(long)]
    script_file: Option<PathBuf>,
    /// JSON schema fragment file
    #[arg(long)]
    schema_file: Option<PathBuf>,
    #[arg(long)]
    preview_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sectionkit_core=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let project_root = match cli.project {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    let ctx = AppContext::load(project_root)?;
    tracing::debug!(
        project = %ctx.project_root().display(),
        roots = ctx.library_roots().as_slice().len(),
        "Loaded configuration"
    );

    run(&ctx, cli.command, cli.format)
}

fn run(ctx: &AppContext, command: Commands, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Install {
            section,
            theme,
            shop,
        } => {
            let shop = require_shop(ctx, shop.as_deref())?;
            let service = ctx.rest_section_service(Some(&shop));
            let result = service.install_section(InstallSectionRequest {
                shop,
                section_id: section,
                theme_id: theme,
            })?;
            output::print_installation(&result, format)?;
        }
        Commands::Themes { shop } => {
            let shop = require_shop(ctx, shop.as_deref())?;
            let service = ctx.rest_section_service(Some(&shop));
            let themes = service.list_themes(&shop)?;
            output::print_themes(&shop, &themes, format)?;
        }
        Commands::List => {
            let sections = library_service(ctx).list_sections()?;
            output::print_sections(&sections, format)?;
        }
        Commands::Show { id } => {
            let section = library_service(ctx).get_section(&id)?;
            output::print_section(&section, format)?;
        }
        Commands::Upload(args) => run_upload(ctx, *args, format)?,
        Commands::Update(args) => run_update(ctx, args, format)?,
        Commands::Delete { id, yes } => run_delete(ctx, &id, yes, format)?,
        Commands::Preview { id, out } => {
            let image = library_service(ctx).get_preview(&id)?;
            std::fs::write(&out, &image.bytes)
                .with_context(|| format!("Failed to write preview: {}", out.display()))?;
            output::print_preview_written(&id, &out, Some(image.content_type), format)?;
        }
        Commands::Placeholder { id } => {
            let written = library_service(ctx).generate_placeholder(&id)?;
            output::print_placeholder(&id, written, format)?;
        }
        Commands::SetPreview { id, file } => {
            let upload = read_preview(&file)?;
            let path = library_service(ctx).save_preview(SavePreviewRequest {
                section_id: id.clone(),
                image_data: encode_data_url(&upload)?,
            })?;
            output::print_preview_written(&id, &path, None, format)?;
        }
    }
    Ok(())
}

/// Service for commands that never reach the remote API.
fn library_service(ctx: &AppContext) -> SectionService {
    ctx.rest_section_service(None)
}

fn require_shop(ctx: &AppContext, explicit: Option<&str>) -> Result<String> {
    ctx.shop(explicit).ok_or_else(|| {
        anyhow::anyhow!("No shop given: pass --shop or set shop.domain in sectionkit.toml")
    })
}

fn run_upload(ctx: &AppContext, args: UploadArgs, format: OutputFormat) -> Result<()> {
    let content = read_text(&args.content_file)?;
    let extra = args.extra;
    let request = UploadSectionRequest {
        section_id: args.id,
        title: args.title,
        description: extra.description,
        categories: extra.categories.map(CategoriesInput::Text),
        price: extra.price,
        content,
        style: read_optional_text(extra.style_file.as_deref())?,
        script: read_optional_text(extra.script_file.as_deref())?,
        schema: read_optional_text(extra.schema_file.as_deref())?.map(serde_json::Value::String),
        preview_image: read_optional_preview(extra.preview_file.as_deref())?,
    };

    let id = library_service(ctx).upload_section(request)?;
    output::print_uploaded(&id, format)
}

fn run_update(ctx: &AppContext, args: UpdateArgs, format: OutputFormat) -> Result<()> {
    let fields = args.extra;
    let request = UpdateSectionRequest {
        title: args.title,
        description: fields.description,
        categories: fields.categories.map(CategoriesInput::Text),
        price: fields.price,
        content: read_optional_text(args.content_file.as_deref())?,
        style: read_optional_text(fields.style_file.as_deref())?,
        script: read_optional_text(fields.script_file.as_deref())?,
        schema: read_optional_text(fields.schema_file.as_deref())?.map(serde_json::Value::String),
        preview_image: read_optional_preview(fields.preview_file.as_deref())?,
    };

    let metadata = library_service(ctx).update_section(&args.id, request)?;
    output::print_updated(&metadata, format)
}

fn run_delete(ctx: &AppContext, id: &str, yes: bool, format: OutputFormat) -> Result<()> {
    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete section '{}' from every library root?", id))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted");
            return Ok(());
        }
    }

    let removed = library_service(ctx).delete_section(id)?;
    output::print_deleted(id, removed, format)
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_optional_text(path: Option<&Path>) -> Result<Option<String>> {
    path.map(read_text).transpose()
}

fn read_preview(path: &Path) -> Result<PreviewUpload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    Ok(PreviewUpload::from_file_name(file_name, bytes))
}

fn read_optional_preview(path: Option<&Path>) -> Result<Option<String>> {
    path.map(|path| {
        let upload = read_preview(path)?;
        Ok(encode_data_url(&upload)?)
    })
    .transpose()
}
