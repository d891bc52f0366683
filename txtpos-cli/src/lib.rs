// All core functionality is in txtpos-core
// This CLI acts as a thin wrapper around the core library

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use txtpos_core::{JsonSourceLoader, SourceLoader};

// Re-export core types for convenience
pub use txtpos_core::*;

/// Page dumps directly inside `dir` (not recursive), sorted by name.
pub fn list_page_dumps(dir: &Path) -> Result<Vec<PathBuf>> {
    let loader = JsonSourceLoader;
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && loader.supports_file_type(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Log a failed document and return the console line for it.
pub fn failure_message(input: &Path, error: &anyhow::Error) -> String {
    log::error!("{}: {error:#}", input.display());
    format!("❌ Processing failed: {}: {error:#}", input.display())
}

/// Usage text shown when no input is given, including the record layout.
pub fn usage(delimiter: &str) -> String {
    let mut text = String::new();
    text.push_str("Usage: txtpos (-f <page-dump.json> | -d <directory>) [options]\n");
    text.push_str("\n📄 Line records (<stem>.info), one per word:\n  ");
    text.push_str(&LINE_RECORD_FIELDS.join(delimiter));
    text.push_str("\n\n📐 Grid records (<stem>.grid, with --grid): one line per table row,\n");
    text.push_str("   cells joined by the grid delimiter\n");
    text.push_str("\n📝 Usage Examples:\n");
    text.push_str("  txtpos -f report.json\n");
    text.push_str("  txtpos -d dumps/ -s 2 -e 5 --grid\n");
    text.push_str("  txtpos -f report.json -c txtpos.yaml --profile\n");
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn lists_only_json_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("a.JSON"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();
        fs::write(dir.path().join("nested.json").join("c.json"), "{}").unwrap();

        let files = list_page_dumps(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.JSON", "b.json"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(list_page_dumps(Path::new("/no/such/dir")).is_err());
    }

    #[test]
    fn failure_message_names_the_input_and_cause() {
        let error = anyhow::anyhow!("no such file").context("opening report.json");
        let message = failure_message(Path::new("dumps/report.json"), &error);
        assert!(message.starts_with("❌ Processing failed: dumps/report.json"));
        assert!(message.ends_with("opening report.json: no such file"));
    }

    #[test]
    fn usage_lists_record_fields() {
        let text = usage(";");
        assert!(text.contains("page;line;x1;y1;x2;y2;font name;font size;space width;text"));
    }
}
