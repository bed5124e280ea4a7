use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;

use recipebox_core::models::ImportReport;
use recipebox_core::store::RecipeStore;

use super::helpers::{print_json, read_input, write_output};

/// What an `import` or `export` command moves.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Collection {
    Recipes,
    Lists,
}

impl Collection {
    fn noun(self) -> &'static str {
        match self {
            Collection::Recipes => "recipes",
            Collection::Lists => "shopping lists",
        }
    }
}

pub(crate) fn cmd_export(
    store: &RecipeStore,
    what: Collection,
    ids: &[i64],
    file: &Path,
    json: bool,
) -> Result<()> {
    let ids = if ids.is_empty() { None } else { Some(ids) };
    let (text, count) = match what {
        Collection::Recipes => {
            let records = store.export_recipes(ids)?;
            (serde_json::to_string_pretty(&records)?, records.len())
        }
        Collection::Lists => {
            let records = store.export_shopping_lists(ids)?;
            (serde_json::to_string_pretty(&records)?, records.len())
        }
    };
    write_output(file, &text)?;

    // stdout already carries the payload when exporting to `-`
    if file.as_os_str() == "-" {
        return Ok(());
    }
    if json {
        println!(
            "{}",
            serde_json::json!({ "exported": count, "file": file.display().to_string() })
        );
    } else {
        println!("Exported {count} {} to {}", what.noun(), file.display());
    }
    Ok(())
}

pub(crate) fn cmd_import(
    store: &RecipeStore,
    what: Collection,
    file: &Path,
    json: bool,
) -> Result<()> {
    let text = read_input(file)?;
    let report = match what {
        Collection::Recipes => store.import_recipes_json(&text)?,
        Collection::Lists => store.import_shopping_lists_json(&text)?,
    };

    if json {
        return print_json(&report);
    }
    print_report(&report, what);
    Ok(())
}

fn print_report(report: &ImportReport, what: Collection) {
    println!("Import complete.\n");
    println!("  Imported: {} {}", report.imported, what.noun());
    println!("  Skipped:  {}", report.failures.len());
    for failure in &report.failures {
        println!("    record {}: {}", failure.index, failure.message);
    }
}
