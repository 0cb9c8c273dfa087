//! TOML parser with helpful error messages

use std::path::Path;

use anyhow::{Context, Result};

use super::schema::SectionkitConfig;

/// Parse sectionkit.toml with detailed error messages
pub fn parse_config_file(path: &Path) -> Result<SectionkitConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse sectionkit.toml content from string
pub fn parse_config_str(content: &str) -> Result<SectionkitConfig> {
    let config: SectionkitConfig =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;

    config.validate().context("Invalid configuration")?;

    Ok(config)
}

fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let message = error.message().to_string();

    let line_num = error
        .span()
        .map(|span| {
            let end = span.start.min(content.len());
            content.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
        });

    match line_num {
        Some(line_num) => anyhow::anyhow!(
            "TOML parsing error at line {}:\n{}\n\nError: {}",
            line_num,
            line_context(content, line_num),
            message
        ),
        None => anyhow::anyhow!("TOML parsing error: {}", message),
    }
}

/// Lines around `line_num`, the offending one marked.
fn line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2).min(lines.len());
    let end = (line_num + 1).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize a configuration to TOML string
pub fn to_toml(config: &SectionkitConfig) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize configuration to TOML")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_full_config() {
        let toml = r#"
[library]
roots = ["../sections", "sections"]
preview_cache = "public/section-previews"

[shop]
domain = "demo.myshopify.com"
api_version = "2024-07"
timeout_secs = 12
"#;

        let config = parse_config_str(toml).unwrap();
        assert_eq!(
            config.library.roots,
            Some(vec![PathBuf::from("../sections"), PathBuf::from("sections")])
        );
        assert_eq!(config.shop.domain.as_deref(), Some("demo.myshopify.com"));
        assert_eq!(config.shop.api_version.as_deref(), Some("2024-07"));
        assert_eq!(config.shop.timeout_secs, Some(12));
        assert_eq!(config.shop.access_token_env, None);
    }

    #[test]
    fn empty_config_is_valid() {
        assert_eq!(parse_config_str("").unwrap(), SectionkitConfig::new());
    }

    #[test]
    fn type_error_reports_line() {
        let toml = "[shop]\ndomain = \"a\"\ntimeout_secs = \"soon\"";
        let err = parse_config_str(toml).unwrap_err().to_string();
        assert!(err.contains("TOML parsing error at line 3"), "{err}");
        assert!(err.contains(">>>"), "{err}");
    }

    #[test]
    fn validation_errors_are_reported() {
        let err = parse_config_str("[shop]\ntimeout_secs = 0\n").unwrap_err();
        assert!(format!("{err:#}").contains("timeout_secs"));
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = SectionkitConfig::new();
        config.shop.domain = Some("demo.myshopify.com".to_string());
        config.library.preview_cache = Some(PathBuf::from("cache"));

        let text = to_toml(&config).unwrap();
        assert_eq!(parse_config_str(&text).unwrap(), config);
    }

    #[test]
    fn reads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[shop]\ndomain = \"file.myshopify.com\"").unwrap();

        let config = parse_config_file(file.path()).unwrap();
        assert_eq!(config.shop.domain.as_deref(), Some("file.myshopify.com"));
    }

    #[test]
    fn missing_file_has_context() {
        let err = parse_config_file(Path::new("/nonexistent/sectionkit.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
