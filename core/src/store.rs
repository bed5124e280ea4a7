use std::path::Path;

use chrono::Local;
use rusqlite::backup::Progress;
use rusqlite::types::Value;
use rusqlite::{
    Connection, DatabaseName, OpenFlags, OptionalExtension, params, params_from_iter,
};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::models::{
    Ingredient, Label, NewRecipe, Recipe, RecipeDetail, RecipeFilter, RecipeSummary,
    ShoppingList, ShoppingListDetail, ShoppingListItem, ShoppingListSummary, validate_new_recipe,
    validate_required,
};

pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Breakfast",
    "Lunch",
    "Dinner",
    "Dessert",
    "Appetizer",
    "Snack",
    "Soup",
    "Salad",
    "Main Course",
    "Side Dish",
    "Beverage",
    "Baked Goods",
];

pub const DEFAULT_TAGS: &[&str] = &[
    "Vegetarian",
    "Vegan",
    "Gluten-Free",
    "Dairy-Free",
    "Nut-Free",
    "Low-Carb",
    "High-Protein",
    "Quick",
    "Easy",
    "Budget-Friendly",
    "One-Pot",
    "Kid-Friendly",
];

const GENERATED_LIST_NOTES: &str = "Generated from selected recipes";

/// Latest `user_version` written by `migrate`.
const SCHEMA_VERSION: i64 = 2;

/// The two many-to-many name lists a recipe can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Taxonomy {
    Category,
    Tag,
}

impl Taxonomy {
    fn table(self) -> &'static str {
        match self {
            Taxonomy::Category => "categories",
            Taxonomy::Tag => "tags",
        }
    }

    fn link_table(self) -> &'static str {
        match self {
            Taxonomy::Category => "recipe_categories",
            Taxonomy::Tag => "recipe_tags",
        }
    }

    fn link_column(self) -> &'static str {
        match self {
            Taxonomy::Category => "category_id",
            Taxonomy::Tag => "tag_id",
        }
    }

    fn entity(self) -> &'static str {
        match self {
            Taxonomy::Category => "Category",
            Taxonomy::Tag => "Tag",
        }
    }
}

/// Sole owner of the recipe database connection.
///
/// Every operation runs to completion before returning; writes that touch
/// more than one table share a single transaction.
pub struct RecipeStore {
    pub(crate) conn: Connection,
}

impl RecipeStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        let store = RecipeStore { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS recipes (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
                    description TEXT,
                    instructions TEXT,
                    prep_time INTEGER,
                    cook_time INTEGER,
                    servings INTEGER,
                    difficulty TEXT,
                    source TEXT,
                    notes TEXT,
                    favorite INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS categories (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE
                );

                CREATE TABLE IF NOT EXISTS recipe_categories (
                    recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                    category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                    PRIMARY KEY (recipe_id, category_id)
                );

                CREATE TABLE IF NOT EXISTS tags (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE
                );

                CREATE TABLE IF NOT EXISTS recipe_tags (
                    recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                    PRIMARY KEY (recipe_id, tag_id)
                );

                CREATE TABLE IF NOT EXISTS ingredients (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                    text TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS shopping_lists (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    notes TEXT,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS shopping_list_items (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    shopping_list_id INTEGER NOT NULL
                        REFERENCES shopping_lists(id) ON DELETE CASCADE,
                    text TEXT NOT NULL,
                    checked INTEGER NOT NULL DEFAULT 0
                );

                CREATE INDEX IF NOT EXISTS idx_recipes_name ON recipes(name);
                CREATE INDEX IF NOT EXISTS idx_ingredients_recipe ON ingredients(recipe_id);
                CREATE INDEX IF NOT EXISTS idx_recipe_categories_category
                    ON recipe_categories(category_id);
                CREATE INDEX IF NOT EXISTS idx_recipe_tags_tag ON recipe_tags(tag_id);
                CREATE INDEX IF NOT EXISTS idx_shopping_list_items_list
                    ON shopping_list_items(shopping_list_id);

                PRAGMA user_version = 1;",
            )?;
        }

        if version < 2 {
            // Seed the stock categories and tags offered to a fresh collection
            for name in DEFAULT_CATEGORIES {
                self.conn.execute(
                    "INSERT OR IGNORE INTO categories (name) VALUES (?1)",
                    params![name],
                )?;
            }
            for name in DEFAULT_TAGS {
                self.conn
                    .execute("INSERT OR IGNORE INTO tags (name) VALUES (?1)", params![name])?;
            }
            self.conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    // Expects columns:
    // 0: id, 1: name, 2: description, 3: instructions, 4: prep_time,
    // 5: cook_time, 6: servings, 7: difficulty, 8: source, 9: notes,
    // 10: favorite, 11: created_at
    fn recipe_from_row(row: &rusqlite::Row) -> rusqlite::Result<Recipe> {
        Ok(Recipe {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            instructions: row.get(3)?,
            prep_time: row.get(4)?,
            cook_time: row.get(5)?,
            servings: row.get(6)?,
            difficulty: row.get(7)?,
            source: row.get(8)?,
            notes: row.get(9)?,
            favorite: row.get(10)?,
            created_at: row.get(11)?,
        })
    }

    fn recipe_summary_from_row(row: &rusqlite::Row) -> rusqlite::Result<RecipeSummary> {
        Ok(RecipeSummary {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            difficulty: row.get(3)?,
            favorite: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn shopping_list_from_row(row: &rusqlite::Row) -> rusqlite::Result<ShoppingList> {
        Ok(ShoppingList {
            id: row.get(0)?,
            name: row.get(1)?,
            notes: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn item_from_row(row: &rusqlite::Row) -> rusqlite::Result<ShoppingListItem> {
        Ok(ShoppingListItem {
            id: row.get(0)?,
            shopping_list_id: row.get(1)?,
            text: row.get(2)?,
            checked: row.get(3)?,
        })
    }

    // --- Recipes ---

    pub fn add_recipe(&self, recipe: &NewRecipe) -> Result<i64> {
        let recipe = validate_new_recipe(recipe)?;
        let tx = self.conn.unchecked_transaction()?;
        let id = insert_recipe(&tx, &recipe)?;
        tx.commit()?;
        debug!(recipe_id = id, name = %recipe.name, "added recipe");
        Ok(id)
    }

    /// Replace every field, ingredient line, category and tag of a recipe.
    pub fn update_recipe(&self, id: i64, recipe: &NewRecipe) -> Result<()> {
        ensure_exists(&self.conn, "recipes", "Recipe", id)?;
        let recipe = validate_new_recipe(recipe)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE recipes SET name = ?1, description = ?2, instructions = ?3, prep_time = ?4,
             cook_time = ?5, servings = ?6, difficulty = ?7, source = ?8, notes = ?9, favorite = ?10
             WHERE id = ?11",
            params![
                recipe.name,
                recipe.description,
                recipe.instructions,
                recipe.prep_time,
                recipe.cook_time,
                recipe.servings,
                recipe.difficulty,
                recipe.source,
                recipe.notes,
                recipe.favorite,
                id,
            ],
        )?;
        tx.execute("DELETE FROM ingredients WHERE recipe_id = ?1", params![id])?;
        tx.execute(
            "DELETE FROM recipe_categories WHERE recipe_id = ?1",
            params![id],
        )?;
        tx.execute("DELETE FROM recipe_tags WHERE recipe_id = ?1", params![id])?;
        insert_ingredients(&tx, id, &recipe.ingredients)?;
        link_labels(&tx, Taxonomy::Category, id, &recipe.categories)?;
        link_labels(&tx, Taxonomy::Tag, id, &recipe.tags)?;
        tx.commit()?;

        debug!(recipe_id = id, "replaced recipe");
        Ok(())
    }

    /// Delete a recipe; its ingredients and category/tag links go with it.
    pub fn delete_recipe(&self, id: i64) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM recipes WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(StoreError::not_found("Recipe", id));
        }
        debug!(recipe_id = id, "deleted recipe");
        Ok(())
    }

    pub fn get_recipe(&self, id: i64) -> Result<Recipe> {
        self.conn
            .query_row(
                "SELECT id, name, description, instructions, prep_time, cook_time, servings,
                        difficulty, source, notes, favorite, created_at
                 FROM recipes WHERE id = ?1",
                params![id],
                Self::recipe_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("Recipe", id))
    }

    pub fn get_recipe_ingredients(&self, recipe_id: i64) -> Result<Vec<Ingredient>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, recipe_id, text FROM ingredients WHERE recipe_id = ?1 ORDER BY id",
        )?;
        let ingredients = stmt
            .query_map(params![recipe_id], |row| {
                Ok(Ingredient {
                    id: row.get(0)?,
                    recipe_id: row.get(1)?,
                    text: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ingredients)
    }

    pub fn get_recipe_detail(&self, id: i64) -> Result<RecipeDetail> {
        let recipe = self.get_recipe(id)?;
        let ingredients = self.get_recipe_ingredients(id)?;
        let categories = self.recipe_labels(Taxonomy::Category, id)?;
        let tags = self.recipe_labels(Taxonomy::Tag, id)?;
        Ok(RecipeDetail {
            recipe,
            ingredients,
            categories,
            tags,
        })
    }

    /// Recipes matching every predicate in `filter`, ordered by name.
    pub fn list_recipes(&self, filter: &RecipeFilter) -> Result<Vec<RecipeSummary>> {
        let mut sql = String::from(
            "SELECT r.id, r.name, r.description, r.difficulty, r.favorite, r.created_at
             FROM recipes r",
        );
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(query) = filter.name_contains.as_deref() {
            let escaped = query
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            conditions.push("r.name LIKE ? ESCAPE '\\'");
            values.push(Value::Text(format!("%{escaped}%")));
        }
        if let Some(category_id) = filter.category_id {
            conditions.push(
                "EXISTS (SELECT 1 FROM recipe_categories rc
                         WHERE rc.recipe_id = r.id AND rc.category_id = ?)",
            );
            values.push(Value::Integer(category_id));
        }
        if let Some(tag_id) = filter.tag_id {
            conditions.push(
                "EXISTS (SELECT 1 FROM recipe_tags rt
                         WHERE rt.recipe_id = r.id AND rt.tag_id = ?)",
            );
            values.push(Value::Integer(tag_id));
        }
        if filter.favorite_only {
            conditions.push("r.favorite = 1");
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY r.name COLLATE NOCASE, r.id");

        let mut stmt = self.conn.prepare(&sql)?;
        let recipes = stmt
            .query_map(params_from_iter(values.iter()), Self::recipe_summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    pub(crate) fn recipe_ids(&self) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare("SELECT id FROM recipes ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    // --- Categories and tags ---

    fn recipe_labels(&self, taxonomy: Taxonomy, recipe_id: i64) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT l.name FROM {link} x JOIN {table} l ON l.id = x.{column}
             WHERE x.recipe_id = ?1 ORDER BY l.name COLLATE NOCASE",
            link = taxonomy.link_table(),
            table = taxonomy.table(),
            column = taxonomy.link_column(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let names = stmt
            .query_map(params![recipe_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn label_entries(&self, taxonomy: Taxonomy) -> Result<Vec<Label>> {
        let sql = format!(
            "SELECT id, name FROM {} ORDER BY name COLLATE NOCASE",
            taxonomy.table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let labels = stmt
            .query_map([], |row| {
                Ok(Label {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(labels)
    }

    fn add_label(&self, taxonomy: Taxonomy, name: &str) -> Result<i64> {
        let name = validate_required(&format!("{} name", taxonomy.entity()), name)?;
        let id = ensure_label(&self.conn, taxonomy, &name)?;
        debug!(id, name = %name, table = taxonomy.table(), "ensured label");
        Ok(id)
    }

    fn delete_label(&self, taxonomy: Taxonomy, id: i64) -> Result<()> {
        let rows = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", taxonomy.table()),
            params![id],
        )?;
        if rows == 0 {
            return Err(StoreError::not_found(taxonomy.entity(), id));
        }
        debug!(id, table = taxonomy.table(), "deleted label");
        Ok(())
    }

    /// All category names, alphabetical.
    pub fn list_categories(&self) -> Result<Vec<String>> {
        Ok(self
            .label_entries(Taxonomy::Category)?
            .into_iter()
            .map(|c| c.name)
            .collect())
    }

    pub fn list_category_entries(&self) -> Result<Vec<Label>> {
        self.label_entries(Taxonomy::Category)
    }

    /// Returns the existing id when a category with this name already exists.
    pub fn add_category(&self, name: &str) -> Result<i64> {
        self.add_label(Taxonomy::Category, name)
    }

    /// Remove a category and its recipe links; the recipes themselves stay.
    pub fn delete_category(&self, id: i64) -> Result<()> {
        self.delete_label(Taxonomy::Category, id)
    }

    pub fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self
            .label_entries(Taxonomy::Tag)?
            .into_iter()
            .map(|t| t.name)
            .collect())
    }

    pub fn list_tag_entries(&self) -> Result<Vec<Label>> {
        self.label_entries(Taxonomy::Tag)
    }

    pub fn add_tag(&self, name: &str) -> Result<i64> {
        self.add_label(Taxonomy::Tag, name)
    }

    pub fn delete_tag(&self, id: i64) -> Result<()> {
        self.delete_label(Taxonomy::Tag, id)
    }

    // --- Shopping lists ---

    pub fn add_shopping_list(&self, name: &str, notes: Option<&str>) -> Result<i64> {
        let name = validate_required("Shopping list name", name)?;
        let id = insert_shopping_list(&self.conn, &name, notes)?;
        debug!(list_id = id, name = %name, "added shopping list");
        Ok(id)
    }

    pub fn update_shopping_list(&self, id: i64, name: &str, notes: Option<&str>) -> Result<()> {
        ensure_exists(&self.conn, "shopping_lists", "Shopping list", id)?;
        let name = validate_required("Shopping list name", name)?;
        self.conn.execute(
            "UPDATE shopping_lists SET name = ?1, notes = ?2 WHERE id = ?3",
            params![name, non_blank(notes), id],
        )?;
        Ok(())
    }

    /// Every list with its item counts, newest first.
    pub fn list_shopping_lists(&self) -> Result<Vec<ShoppingListSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT sl.id, sl.name, sl.notes, sl.created_at,
                    COUNT(i.id), COALESCE(SUM(i.checked), 0)
             FROM shopping_lists sl
             LEFT JOIN shopping_list_items i ON i.shopping_list_id = sl.id
             GROUP BY sl.id
             ORDER BY sl.id DESC",
        )?;
        let lists = stmt
            .query_map([], |row| {
                Ok(ShoppingListSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    notes: row.get(2)?,
                    created_at: row.get(3)?,
                    item_count: row.get(4)?,
                    checked_count: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lists)
    }

    pub fn get_shopping_list(&self, id: i64) -> Result<ShoppingListDetail> {
        let list = self
            .conn
            .query_row(
                "SELECT id, name, notes, created_at FROM shopping_lists WHERE id = ?1",
                params![id],
                Self::shopping_list_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("Shopping list", id))?;

        let mut stmt = self.conn.prepare(
            "SELECT id, shopping_list_id, text, checked FROM shopping_list_items
             WHERE shopping_list_id = ?1 ORDER BY id",
        )?;
        let items = stmt
            .query_map(params![id], Self::item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ShoppingListDetail { list, items })
    }

    /// Build a list holding every ingredient line of the given recipes.
    ///
    /// Lines are copied verbatim in recipe order, so the same ingredient used
    /// by two recipes appears twice. Without a `name` the list is named after
    /// today's date.
    pub fn generate_shopping_list_from_recipes(
        &self,
        recipe_ids: &[i64],
        name: Option<&str>,
    ) -> Result<i64> {
        let name = match name {
            Some(name) => validate_required("Shopping list name", name)?,
            None => format!("Shopping list ({})", Local::now().format("%Y-%m-%d")),
        };

        let tx = self.conn.unchecked_transaction()?;
        for &recipe_id in recipe_ids {
            ensure_exists(&tx, "recipes", "Recipe", recipe_id)?;
        }
        let list_id = insert_shopping_list(&tx, &name, Some(GENERATED_LIST_NOTES))?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO shopping_list_items (shopping_list_id, text, checked)
                 SELECT ?1, text, 0 FROM ingredients WHERE recipe_id = ?2 ORDER BY id",
            )?;
            for &recipe_id in recipe_ids {
                stmt.execute(params![list_id, recipe_id])?;
            }
        }
        tx.commit()?;

        info!(list_id, recipes = recipe_ids.len(), "generated shopping list");
        Ok(list_id)
    }

    pub fn add_shopping_list_item(&self, list_id: i64, text: &str) -> Result<i64> {
        ensure_exists(&self.conn, "shopping_lists", "Shopping list", list_id)?;
        let text = validate_required("Item text", text)?;
        let id = insert_item(&self.conn, list_id, &text, false)?;
        debug!(list_id, item_id = id, "added shopping list item");
        Ok(id)
    }

    pub fn set_item_checked(&self, item_id: i64, checked: bool) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE shopping_list_items SET checked = ?1 WHERE id = ?2",
            params![checked, item_id],
        )?;
        if rows == 0 {
            return Err(StoreError::not_found("Shopping list item", item_id));
        }
        Ok(())
    }

    pub fn update_item_text(&self, item_id: i64, text: &str) -> Result<()> {
        let text = validate_required("Item text", text)?;
        let rows = self.conn.execute(
            "UPDATE shopping_list_items SET text = ?1 WHERE id = ?2",
            params![text, item_id],
        )?;
        if rows == 0 {
            return Err(StoreError::not_found("Shopping list item", item_id));
        }
        Ok(())
    }

    pub fn delete_item(&self, item_id: i64) -> Result<()> {
        let rows = self.conn.execute(
            "DELETE FROM shopping_list_items WHERE id = ?1",
            params![item_id],
        )?;
        if rows == 0 {
            return Err(StoreError::not_found("Shopping list item", item_id));
        }
        Ok(())
    }

    /// Delete a list together with all of its items.
    pub fn delete_shopping_list(&self, list_id: i64) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM shopping_lists WHERE id = ?1", params![list_id])?;
        if rows == 0 {
            return Err(StoreError::not_found("Shopping list", list_id));
        }
        debug!(list_id, "deleted shopping list");
        Ok(())
    }

    pub(crate) fn shopping_list_ids(&self) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM shopping_lists ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    // --- Backup / restore ---

    /// Write a consistent snapshot of the whole database to `path`.
    pub fn backup_to(&self, path: &Path) -> Result<()> {
        self.conn.backup(DatabaseName::Main, path, None::<fn(Progress)>)?;
        info!(path = %path.display(), "database backed up");
        Ok(())
    }

    /// Replace the current contents with the database stored at `path`.
    pub fn restore_from(&mut self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(StoreError::validation(format!(
                "Backup file not found: {}",
                path.display()
            )));
        }
        check_backup_file(path)?;
        self.conn.restore(DatabaseName::Main, path, None::<fn(Progress)>)?;
        self.conn.pragma_update(None, "foreign_keys", true)?;
        self.migrate()?;
        info!(path = %path.display(), "database restored");
        Ok(())
    }
}

/// Reject anything that is not a recipe database this build can migrate.
fn check_backup_file(path: &Path) -> Result<()> {
    let not_a_backup = || {
        StoreError::validation(format!(
            "Not a recipe database backup: {}",
            path.display()
        ))
    };

    let source = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|_| not_a_backup())?;
    let version: i64 = source
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|_| not_a_backup())?;
    let has_recipes: bool = source
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'recipes')",
            [],
            |row| row.get(0),
        )
        .map_err(|_| not_a_backup())?;

    if !(1..=SCHEMA_VERSION).contains(&version) || !has_recipes {
        return Err(not_a_backup());
    }
    Ok(())
}

// --- Statement helpers shared with the import path ---

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn ensure_exists(conn: &Connection, table: &str, entity: &'static str, id: i64) -> Result<()> {
    let exists: bool = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
        params![id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(StoreError::not_found(entity, id))
    }
}

/// Id of the category/tag called `name`, creating it on first use.
fn ensure_label(conn: &Connection, taxonomy: Taxonomy, name: &str) -> Result<i64> {
    let table = taxonomy.table();
    conn.execute(
        &format!("INSERT OR IGNORE INTO {table} (name) VALUES (?1)"),
        params![name],
    )?;
    let id = conn.query_row(
        &format!("SELECT id FROM {table} WHERE name = ?1"),
        params![name],
        |row| row.get(0),
    )?;
    Ok(id)
}

fn link_labels(
    conn: &Connection,
    taxonomy: Taxonomy,
    recipe_id: i64,
    names: &[String],
) -> Result<()> {
    let sql = format!(
        "INSERT OR IGNORE INTO {} (recipe_id, {}) VALUES (?1, ?2)",
        taxonomy.link_table(),
        taxonomy.link_column()
    );
    for name in names {
        let label_id = ensure_label(conn, taxonomy, name)?;
        conn.execute(&sql, params![recipe_id, label_id])?;
    }
    Ok(())
}

fn insert_ingredients(conn: &Connection, recipe_id: i64, lines: &[String]) -> Result<()> {
    let mut stmt = conn.prepare("INSERT INTO ingredients (recipe_id, text) VALUES (?1, ?2)")?;
    for line in lines {
        stmt.execute(params![recipe_id, line])?;
    }
    Ok(())
}

/// Insert an already validated recipe with its ingredients and links.
pub(crate) fn insert_recipe(conn: &Connection, recipe: &NewRecipe) -> Result<i64> {
    let now = Local::now().to_rfc3339();
    conn.execute(
        "INSERT INTO recipes (name, description, instructions, prep_time, cook_time, servings,
                              difficulty, source, notes, favorite, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            recipe.name,
            recipe.description,
            recipe.instructions,
            recipe.prep_time,
            recipe.cook_time,
            recipe.servings,
            recipe.difficulty,
            recipe.source,
            recipe.notes,
            recipe.favorite,
            now,
        ],
    )?;
    let id = conn.last_insert_rowid();
    insert_ingredients(conn, id, &recipe.ingredients)?;
    link_labels(conn, Taxonomy::Category, id, &recipe.categories)?;
    link_labels(conn, Taxonomy::Tag, id, &recipe.tags)?;
    Ok(id)
}

pub(crate) fn insert_shopping_list(
    conn: &Connection,
    name: &str,
    notes: Option<&str>,
) -> Result<i64> {
    let now = Local::now().to_rfc3339();
    conn.execute(
        "INSERT INTO shopping_lists (name, notes, created_at) VALUES (?1, ?2, ?3)",
        params![name, non_blank(notes), now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn insert_item(
    conn: &Connection,
    list_id: i64,
    text: &str,
    checked: bool,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO shopping_list_items (shopping_list_id, text, checked) VALUES (?1, ?2, ?3)",
        params![list_id, text, checked],
    )?;
    Ok(conn.last_insert_rowid())
}
