mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use crate::commands::{
    Collection, LabelKind, RecipeArgs, cmd_backup, cmd_export, cmd_import, cmd_label_add,
    cmd_label_delete, cmd_label_list, cmd_list_add_item, cmd_list_delete, cmd_list_edit_item,
    cmd_list_generate, cmd_list_list, cmd_list_new, cmd_list_remove_item, cmd_list_rename,
    cmd_list_set_checked, cmd_list_show, cmd_recipe_add, cmd_recipe_delete, cmd_recipe_list,
    cmd_recipe_show, cmd_recipe_update, cmd_restore, json_error,
};
use crate::config::Config;
use recipebox_core::store::RecipeStore;

#[derive(Parser)]
#[command(
    name = "recipebox",
    version,
    about = "A local recipe organizer with shopping lists"
)]
struct Cli {
    /// Path to the database file (overrides RECIPEBOX_DB)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage recipes
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },
    /// Manage recipe categories
    Category {
        #[command(subcommand)]
        command: LabelCommands,
    },
    /// Manage recipe tags
    Tag {
        #[command(subcommand)]
        command: LabelCommands,
    },
    /// Manage shopping lists
    List {
        #[command(subcommand)]
        command: ListCommands,
    },
    /// Export recipes or shopping lists as JSON
    Export {
        /// What to export
        #[arg(value_enum)]
        what: Collection,
        /// Destination file ("-" for stdout)
        file: PathBuf,
        /// Only export these ids (repeatable, kept in order; default: all)
        #[arg(long = "id")]
        ids: Vec<i64>,
    },
    /// Import recipes or shopping lists from JSON
    Import {
        /// What to import
        #[arg(value_enum)]
        what: Collection,
        /// Source file ("-" for stdin)
        file: PathBuf,
    },
    /// Copy the whole database to a backup file
    Backup {
        /// Destination file
        file: PathBuf,
    },
    /// Replace the database with a previously made backup
    Restore {
        /// Backup file to restore from
        file: PathBuf,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum RecipeCommands {
    /// Add a new recipe
    Add {
        #[command(flatten)]
        recipe: RecipeArgs,
    },
    /// Replace every field of an existing recipe
    Update {
        /// Recipe ID
        id: i64,
        #[command(flatten)]
        recipe: RecipeArgs,
    },
    /// Show a recipe with ingredients, categories and tags
    Show {
        /// Recipe ID
        id: i64,
    },
    /// List recipes, optionally filtered
    List {
        /// Only names containing this text (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,
        /// Only recipes in this category
        #[arg(long)]
        category: Option<String>,
        /// Only recipes with this tag
        #[arg(long)]
        tag: Option<String>,
        /// Only favorites
        #[arg(long)]
        favorites: bool,
    },
    /// Delete a recipe
    Delete {
        /// Recipe ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum LabelCommands {
    /// List all entries
    List,
    /// Add an entry (no-op if the name already exists)
    Add {
        /// Name
        name: String,
    },
    /// Delete an entry; linked recipes are kept
    Delete {
        /// ID to delete
        id: i64,
    },
}

#[derive(Subcommand)]
enum ListCommands {
    /// Create an empty shopping list
    New {
        /// List name
        name: String,
        /// Optional notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show a shopping list and its items
    Show {
        /// List ID
        id: i64,
    },
    /// List all shopping lists, newest first
    List,
    /// Change a list's name and notes
    Rename {
        /// List ID
        id: i64,
        /// New name
        name: String,
        /// New notes (omit to clear)
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a shopping list and all of its items
    Delete {
        /// List ID
        id: i64,
    },
    /// Build a list from the ingredients of one or more recipes
    Generate {
        /// Recipe IDs
        #[arg(required = true)]
        recipe_ids: Vec<i64>,
        /// List name (default: "Shopping list (<today>)")
        #[arg(long)]
        name: Option<String>,
    },
    /// Add an item to a list
    AddItem {
        /// List ID
        list_id: i64,
        /// Item text
        text: String,
    },
    /// Mark an item as bought
    Check {
        /// Item ID
        item_id: i64,
    },
    /// Clear an item's bought mark
    Uncheck {
        /// Item ID
        item_id: i64,
    },
    /// Remove an item from its list
    RemoveItem {
        /// Item ID
        item_id: i64,
    },
    /// Change an item's text
    EditItem {
        /// Item ID
        item_id: i64,
        /// New text
        text: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Warning: {e:#}");
    }

    if let Err(e) = run(cli) {
        if json {
            println!("{}", json_error(&format!("{e:#}")));
        } else {
            eprintln!("Error: {e:#}");
        }
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.db)?;
    let mut store = RecipeStore::open(&config.db_path)?;
    tracing::debug!(path = %config.db_path.display(), "opened recipe store");
    let json = cli.json;

    match cli.command {
        Commands::Recipe { command } => match command {
            RecipeCommands::Add { recipe } => cmd_recipe_add(&store, recipe, json),
            RecipeCommands::Update { id, recipe } => cmd_recipe_update(&store, id, recipe, json),
            RecipeCommands::Show { id } => cmd_recipe_show(&store, id, json),
            RecipeCommands::List {
                search,
                category,
                tag,
                favorites,
            } => cmd_recipe_list(
                &store,
                search,
                category.as_deref(),
                tag.as_deref(),
                favorites,
                json,
            ),
            RecipeCommands::Delete { id } => cmd_recipe_delete(&store, id, json),
        },
        Commands::Category { command } => run_label(&store, LabelKind::Category, command, json),
        Commands::Tag { command } => run_label(&store, LabelKind::Tag, command, json),
        Commands::List { command } => match command {
            ListCommands::New { name, notes } => {
                cmd_list_new(&store, &name, notes.as_deref(), json)
            }
            ListCommands::Show { id } => cmd_list_show(&store, id, json),
            ListCommands::List => cmd_list_list(&store, json),
            ListCommands::Rename { id, name, notes } => {
                cmd_list_rename(&store, id, &name, notes.as_deref(), json)
            }
            ListCommands::Delete { id } => cmd_list_delete(&store, id, json),
            ListCommands::Generate { recipe_ids, name } => {
                cmd_list_generate(&store, &recipe_ids, name.as_deref(), json)
            }
            ListCommands::AddItem { list_id, text } => {
                cmd_list_add_item(&store, list_id, &text, json)
            }
            ListCommands::Check { item_id } => cmd_list_set_checked(&store, item_id, true, json),
            ListCommands::Uncheck { item_id } => {
                cmd_list_set_checked(&store, item_id, false, json)
            }
            ListCommands::RemoveItem { item_id } => cmd_list_remove_item(&store, item_id, json),
            ListCommands::EditItem { item_id, text } => {
                cmd_list_edit_item(&store, item_id, &text, json)
            }
        },
        Commands::Export { what, file, ids } => cmd_export(&store, what, &ids, &file, json),
        Commands::Import { what, file } => cmd_import(&store, what, &file, json),
        Commands::Backup { file } => cmd_backup(&store, &file, json),
        Commands::Restore { file, yes } => cmd_restore(&mut store, &file, yes, json),
    }
}

fn run_label(
    store: &RecipeStore,
    kind: LabelKind,
    command: LabelCommands,
    json: bool,
) -> Result<()> {
    match command {
        LabelCommands::List => cmd_label_list(store, kind, json),
        LabelCommands::Add { name } => cmd_label_add(store, kind, &name, json),
        LabelCommands::Delete { id } => cmd_label_delete(store, kind, id, json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_recipe_add_with_repeated_flags() {
        let cli = Cli::try_parse_from([
            "recipebox", "recipe", "add", "Pancakes", "-c", "Breakfast", "-c", "Dessert", "-i",
            "2 eggs", "-i", "flour", "--favorite", "--json",
        ])
        .unwrap();
        assert!(cli.json);
        let Commands::Recipe {
            command: RecipeCommands::Add { recipe },
        } = cli.command
        else {
            panic!("expected recipe add");
        };
        assert_eq!(recipe.name, "Pancakes");
        assert_eq!(recipe.categories, vec!["Breakfast", "Dessert"]);
        assert_eq!(recipe.ingredients, vec!["2 eggs", "flour"]);
        assert!(recipe.favorite);
    }

    #[test]
    fn test_parse_export_ids_and_verbosity() {
        let cli = Cli::try_parse_from([
            "recipebox", "-vv", "export", "recipes", "out.json", "--id", "3", "--id", "1",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Export { what, file, ids } = cli.command else {
            panic!("expected export");
        };
        assert_eq!(what, Collection::Recipes);
        assert_eq!(file, PathBuf::from("out.json"));
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_parse_restore_yes() {
        let cli = Cli::try_parse_from(["recipebox", "restore", "-y", "snap.db"]).unwrap();
        let Commands::Restore { file, yes } = cli.command else {
            panic!("expected restore");
        };
        assert!(yes);
        assert_eq!(file, PathBuf::from("snap.db"));
    }

    #[test]
    fn test_generate_requires_recipe_ids() {
        assert!(Cli::try_parse_from(["recipebox", "list", "generate"]).is_err());
    }
}
