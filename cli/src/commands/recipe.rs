use anyhow::Result;
use clap::Args;

use recipebox_core::models::{NewRecipe, RecipeFilter};
use recipebox_core::store::RecipeStore;

use super::helpers::{exit_empty, find_label_id, print_json, print_recipe_table};

/// Fields shared by `recipe add` and `recipe update`.
#[derive(Args, Debug, Default)]
pub(crate) struct RecipeArgs {
    /// Recipe name
    pub name: String,
    /// Cooking instructions
    #[arg(long)]
    pub instructions: Option<String>,
    /// Mark as favorite
    #[arg(long)]
    pub favorite: bool,
    /// Category name (repeatable; created if missing)
    #[arg(short, long = "category")]
    pub categories: Vec<String>,
    /// Tag name (repeatable; created if missing)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,
    /// Ingredient line, e.g. "2 cups flour" (repeatable, kept in order)
    #[arg(short, long = "ingredient")]
    pub ingredients: Vec<String>,
    /// Short description
    #[arg(long)]
    pub description: Option<String>,
    /// Preparation time in minutes
    #[arg(long)]
    pub prep_time: Option<i64>,
    /// Cooking time in minutes
    #[arg(long)]
    pub cook_time: Option<i64>,
    /// Number of servings
    #[arg(long)]
    pub servings: Option<i64>,
    /// Difficulty: easy, medium, hard
    #[arg(long)]
    pub difficulty: Option<String>,
    /// Where the recipe came from
    #[arg(long)]
    pub source: Option<String>,
    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

impl From<RecipeArgs> for NewRecipe {
    fn from(args: RecipeArgs) -> Self {
        NewRecipe {
            name: args.name,
            instructions: args.instructions,
            favorite: args.favorite,
            description: args.description,
            prep_time: args.prep_time,
            cook_time: args.cook_time,
            servings: args.servings,
            difficulty: args.difficulty,
            source: args.source,
            notes: args.notes,
            categories: args.categories,
            tags: args.tags,
            ingredients: args.ingredients,
        }
    }
}

pub(crate) fn cmd_recipe_add(store: &RecipeStore, args: RecipeArgs, json: bool) -> Result<()> {
    let id = store.add_recipe(&NewRecipe::from(args))?;
    if json {
        print_json(&store.get_recipe_detail(id)?)?;
    } else {
        let name = store.get_recipe(id)?.name;
        println!("Added recipe: {name} (id: {id})");
    }
    Ok(())
}

pub(crate) fn cmd_recipe_update(
    store: &RecipeStore,
    id: i64,
    args: RecipeArgs,
    json: bool,
) -> Result<()> {
    store.update_recipe(id, &NewRecipe::from(args))?;
    if json {
        print_json(&store.get_recipe_detail(id)?)?;
    } else {
        println!("Updated recipe {id}");
    }
    Ok(())
}

pub(crate) fn cmd_recipe_show(store: &RecipeStore, id: i64, json: bool) -> Result<()> {
    let detail = store.get_recipe_detail(id)?;

    if json {
        return print_json(&detail);
    }

    let recipe = &detail.recipe;
    let star = if recipe.favorite { " *" } else { "" };
    println!("=== {}{star} ===", recipe.name);
    if let Some(ref d) = recipe.description {
        println!("  {d}");
    }

    let mut facts = Vec::new();
    if let Some(p) = recipe.prep_time {
        facts.push(format!("Prep: {p} min"));
    }
    if let Some(c) = recipe.cook_time {
        facts.push(format!("Cook: {c} min"));
    }
    if let Some(s) = recipe.servings {
        facts.push(format!("Serves: {s}"));
    }
    if let Some(ref d) = recipe.difficulty {
        facts.push(format!("Difficulty: {d}"));
    }
    if !facts.is_empty() {
        println!("  {}", facts.join("  |  "));
    }
    if !detail.categories.is_empty() {
        println!("  Categories: {}", detail.categories.join(", "));
    }
    if !detail.tags.is_empty() {
        println!("  Tags: {}", detail.tags.join(", "));
    }

    println!("\n  INGREDIENTS:");
    if detail.ingredients.is_empty() {
        println!("    (none)");
    }
    for ing in &detail.ingredients {
        println!("    - {}", ing.text);
    }

    if let Some(ref instructions) = recipe.instructions {
        println!("\n  INSTRUCTIONS:");
        for line in instructions.lines() {
            println!("    {line}");
        }
    }
    if let Some(ref source) = recipe.source {
        println!("\n  Source: {source}");
    }
    if let Some(ref notes) = recipe.notes {
        println!("  Notes: {notes}");
    }

    Ok(())
}

pub(crate) fn cmd_recipe_list(
    store: &RecipeStore,
    search: Option<String>,
    category: Option<&str>,
    tag: Option<&str>,
    favorites: bool,
    json: bool,
) -> Result<()> {
    let category_id = match category {
        Some(name) => Some(find_label_id(&store.list_category_entries()?, name, "category")?),
        None => None,
    };
    let tag_id = match tag {
        Some(name) => Some(find_label_id(&store.list_tag_entries()?, name, "tag")?),
        None => None,
    };

    let filter = RecipeFilter {
        name_contains: search.filter(|s| !s.trim().is_empty()),
        category_id,
        tag_id,
        favorite_only: favorites,
    };

    let recipes = store.list_recipes(&filter)?;
    if recipes.is_empty() {
        exit_empty("recipes", json);
    }

    if json {
        return print_json(&recipes);
    }
    print_recipe_table(&recipes);
    Ok(())
}

pub(crate) fn cmd_recipe_delete(store: &RecipeStore, id: i64, json: bool) -> Result<()> {
    store.delete_recipe(id)?;
    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted recipe {id}");
    }
    Ok(())
}
