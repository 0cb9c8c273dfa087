//! Table and JSON rendering for command results.

use std::path::Path;

use anyhow::Result;
use console::style;

use sectionkit_core::deploy::{AssetOutcome, InstallationResult, SkipReason};
use sectionkit_core::library::{PreviewRef, SectionMetadata, SectionSummary, StoredSection};
use sectionkit_core::theme::Theme;

use crate::OutputFormat;

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_installation(result: &InstallationResult, format: OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        return print_json(result);
    }

    let theme = match &result.theme_name {
        Some(name) => format!("{} ({})", result.theme_id, name),
        None => result.theme_id.to_string(),
    };
    if result.is_complete() {
        println!(
            "{} Installed '{}' into theme {}",
            style("✓").green(),
            result.section_id,
            theme
        );
    } else {
        println!(
            "{} Installed '{}' into theme {} with asset failures",
            style("⚠").yellow(),
            result.section_id,
            theme
        );
    }

    for asset in &result.assets {
        let status = match &asset.outcome {
            AssetOutcome::Installed => style("installed".to_string()).green(),
            AssetOutcome::Skipped { reason, .. } => {
                style(format!("skipped ({})", skip_label(*reason))).dim()
            }
            AssetOutcome::Failed { reason } => style(format!("failed: {}", reason)).red(),
        };
        println!("  {:<9} {:<36} {}", asset.kind.label(), asset.key, status);
    }
    Ok(())
}

fn skip_label(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::Absent => "no file",
        SkipReason::AlreadyRegistered => "already registered",
        SkipReason::AggregateUnavailable => "theme has no usable settings schema",
    }
}

pub fn print_themes(shop: &str, themes: &[Theme], format: OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        return print_json(themes);
    }
    if themes.is_empty() {
        println!("No themes found for {}", shop);
        return Ok(());
    }

    println!("{}", style(format!("Themes of {}", shop)).bold());
    for theme in themes {
        let marker = if theme.is_main() {
            style("*").green().to_string()
        } else {
            " ".to_string()
        };
        println!("{} {:<14} {:<12} {}", marker, theme.id, format!("{:?}", theme.role).to_lowercase(), theme.name);
    }
    Ok(())
}

pub fn print_sections(sections: &[SectionSummary], format: OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        return print_json(sections);
    }
    if sections.is_empty() {
        println!("No sections in the library");
        return Ok(());
    }

    for section in sections {
        println!(
            "{:<24} {:<28} {:<8} {}",
            style(&section.id).cyan(),
            section.title,
            section.price,
            section.categories.join(", ")
        );
    }
    println!();
    println!("{} section(s)", sections.len());
    Ok(())
}

pub fn print_section(section: &StoredSection, format: OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        return print_json(section);
    }

    let meta = &section.metadata;
    println!("{}", style(&meta.title).bold());
    println!("  Id:          {}", meta.id);
    println!("  Description: {}", meta.description);
    println!("  Categories:  {}", meta.categories.join(", "));
    println!("  Price:       {}", meta.price);
    println!("  Directory:   {}", section.dir.display());
    println!(
        "  Companions:  style {} / script {} / schema {}",
        yes_no(section.has_style),
        yes_no(section.has_script),
        yes_no(section.has_schema)
    );
    let preview = match &section.preview {
        PreviewRef::File { path } | PreviewRef::Cached { path } => path.display().to_string(),
        PreviewRef::Placeholder => "placeholder".to_string(),
    };
    println!("  Preview:     {}", preview);
    if let Some(updated) = meta.updated_at {
        println!("  Updated:     {}", updated.to_rfc3339());
    }
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

pub fn print_uploaded(section_id: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "sectionId": section_id })),
        OutputFormat::Table => {
            println!("{} Added section '{}'", style("✓").green(), section_id);
            Ok(())
        }
    }
}

pub fn print_updated(metadata: &SectionMetadata, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(metadata),
        OutputFormat::Table => {
            println!("{} Updated section '{}'", style("✓").green(), metadata.id);
            Ok(())
        }
    }
}

pub fn print_deleted(section_id: &str, removed: bool, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "sectionId": section_id,
            "removed": removed,
        })),
        OutputFormat::Table => {
            if removed {
                println!("{} Deleted section '{}'", style("✓").green(), section_id);
            } else {
                println!("• Section '{}' did not exist", section_id);
            }
            Ok(())
        }
    }
}

pub fn print_preview_written(
    section_id: &str,
    path: &Path,
    content_type: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "sectionId": section_id,
            "path": path,
            "contentType": content_type,
        })),
        OutputFormat::Table => {
            println!(
                "{} Preview for '{}' written to {}",
                style("✓").green(),
                section_id,
                path.display()
            );
            Ok(())
        }
    }
}

pub fn print_placeholder(section_id: &str, written: bool, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "sectionId": section_id,
            "generated": written,
        })),
        OutputFormat::Table => {
            if written {
                println!("{} Generated placeholder for '{}'", style("✓").green(), section_id);
            } else {
                println!("• '{}' already has a preview", section_id);
            }
            Ok(())
        }
    }
}
