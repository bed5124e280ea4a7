use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use recipebox_core::models::{Label, RecipeSummary};

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Report an empty listing and exit with status 2.
pub(crate) fn exit_empty(what: &str, json: bool) -> ! {
    if json {
        println!("[]");
    } else {
        eprintln!("No {what} found");
    }
    process::exit(2);
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s
            .char_indices()
            .nth(max.saturating_sub(3))
            .map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

/// Ask a yes/no question on stderr; anything but "y" or "yes" means no.
pub(crate) fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N]: ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().context("No input")??;
    Ok(is_yes(&line))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub(crate) fn check_mark(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

/// Read a whole file, or stdin when `path` is `-`.
pub(crate) fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Write `contents` to a file, or stdout when `path` is `-`.
pub(crate) fn write_output(path: &Path, contents: &str) -> Result<()> {
    if path.as_os_str() == "-" {
        let mut stdout = io::stdout().lock();
        stdout.write_all(contents.as_bytes())?;
        stdout.write_all(b"\n")?;
        return Ok(());
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Resolve a category or tag name to its id, ignoring case.
pub(crate) fn find_label_id(labels: &[Label], name: &str, what: &str) -> Result<i64> {
    let wanted = name.trim();
    labels
        .iter()
        .find(|l| l.name.eq_ignore_ascii_case(wanted))
        .map(|l| l.id)
        .with_context(|| format!("No {what} named '{wanted}'"))
}

pub(crate) fn print_label_table(labels: &[Label]) {
    #[derive(Tabled)]
    struct LabelRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
    }

    let rows: Vec<LabelRow> = labels
        .iter()
        .map(|l| LabelRow {
            id: l.id,
            name: truncate(&l.name, 40),
        })
        .collect();
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn print_recipe_table(recipes: &[RecipeSummary]) {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Difficulty")]
        difficulty: String,
        #[tabled(rename = "Fav")]
        favorite: &'static str,
        #[tabled(rename = "Description")]
        description: String,
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .map(|r| RecipeRow {
            id: r.id,
            name: truncate(&r.name, 30),
            difficulty: r.difficulty.clone().unwrap_or_else(|| "-".into()),
            favorite: if r.favorite { "*" } else { "" },
            description: r
                .description
                .as_deref()
                .map(|d| truncate(d, 40))
                .unwrap_or_default(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(0)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<Label> {
        vec![
            Label {
                id: 1,
                name: "Breakfast".to_string(),
            },
            Label {
                id: 7,
                name: "Main Course".to_string(),
            },
        ]
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        // Should not panic on multi-byte characters
        assert_eq!(truncate("Crème brûlée tart", 10), "Crème b...");
        assert_eq!(truncate("Müsli", 10), "Müsli");
    }

    #[test]
    fn test_truncate_tiny_max() {
        assert_eq!(truncate("hello", 2), "...");
        assert_eq!(truncate("hello", 0), "...");
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES\n"));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("boom"), r#"{"error":"boom"}"#);
        assert_eq!(json_error("say \"hi\""), r#"{"error":"say \"hi\""}"#);
    }

    #[test]
    fn test_find_label_id_ignores_case() {
        assert_eq!(find_label_id(&labels(), "main course", "category").unwrap(), 7);
        assert_eq!(find_label_id(&labels(), " Breakfast ", "category").unwrap(), 1);
    }

    #[test]
    fn test_find_label_id_unknown() {
        let err = find_label_id(&labels(), "Brunch", "category").unwrap_err();
        assert_eq!(err.to_string(), "No category named 'Brunch'");
    }

    #[test]
    fn test_read_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_output(&path, "[]").unwrap();
        assert_eq!(read_input(&path).unwrap(), "[]");
        assert!(read_input(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_check_mark() {
        assert_eq!(check_mark(true), "[x]");
        assert_eq!(check_mark(false), "[ ]");
    }
}
