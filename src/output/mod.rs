use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::OutputFormat;
use crate::document::Document;

/// Render documents in the requested format
pub fn render(docs: &[Document], format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(docs
            .iter()
            .map(|doc| doc.page_content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")),
        OutputFormat::Json => {
            serde_json::to_string_pretty(docs).context("Failed to serialize documents")
        }
    }
}

/// Save documents to file
pub async fn save_to_file(docs: &[Document], path: &Path, format: &OutputFormat) -> Result<()> {
    let content = render(docs, format)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print documents to console
pub fn print_to_console(docs: &[Document], format: &OutputFormat) -> Result<()> {
    println!("{}", render(docs, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SupadataOperation;
    use serde_json::Value;

    fn sample() -> Vec<Document> {
        vec![Document::new("Hello world", "https://youtu.be/abc", SupadataOperation::Transcript)
            .with_metadata("lang", "en")]
    }

    #[test]
    fn test_render_text() {
        assert_eq!(render(&sample(), &OutputFormat::Text).unwrap(), "Hello world");
    }

    #[test]
    fn test_render_json() {
        let rendered = render(&sample(), &OutputFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value[0]["pageContent"], "Hello world");
        assert_eq!(value[0]["metadata"]["supadataOperation"], "transcript");
        assert_eq!(value[0]["metadata"]["lang"], "en");
    }

    #[tokio::test]
    async fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        save_to_file(&sample(), &path, &OutputFormat::Text).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Hello world");
    }
}
