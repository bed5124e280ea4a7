use serde::Serialize;

use crate::error::{ErrorKind, Result, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub servings: Option<i64>,
    pub difficulty: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub favorite: bool,
    pub created_at: String,
}

/// Row shape returned by recipe listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub favorite: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    pub id: i64,
    pub recipe_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<Ingredient>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

/// A category or tag row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub id: i64,
    pub name: String,
}

/// Input for creating a recipe or fully replacing an existing one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRecipe {
    pub name: String,
    pub instructions: Option<String>,
    pub favorite: bool,
    pub description: Option<String>,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub servings: Option<i64>,
    pub difficulty: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
}

impl NewRecipe {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        NewRecipe {
            name: name.into(),
            ..NewRecipe::default()
        }
    }

    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_ingredients<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = lines.into_iter().map(Into::into).collect();
        self
    }
}

/// Predicates for `list_recipes`; every supplied predicate must match.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub name_contains: Option<String>,
    pub category_id: Option<i64>,
    pub tag_id: Option<i64>,
    pub favorite_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingList {
    pub id: i64,
    pub name: String,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingListSummary {
    pub id: i64,
    pub name: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub item_count: i64,
    pub checked_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingListItem {
    pub id: i64,
    pub shopping_list_id: i64,
    pub text: String,
    pub checked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShoppingListDetail {
    #[serde(flatten)]
    pub list: ShoppingList,
    pub items: Vec<ShoppingListItem>,
}

/// Outcome of a batch import: what landed and which records were skipped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub failures: Vec<ImportFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportFailure {
    /// Position of the record in the submitted array.
    pub index: usize,
    pub kind: ErrorKind,
    pub message: String,
}

impl ImportFailure {
    #[must_use]
    pub fn from_error(index: usize, err: &StoreError) -> Self {
        ImportFailure {
            index,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

pub const DIFFICULTIES: &[&str] = &["Easy", "Medium", "Hard"];

/// Trim a required name-like field, rejecting blank values.
pub fn validate_required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Normalize a difficulty to its canonical spelling (case-insensitive).
pub fn validate_difficulty(value: &str) -> Result<String> {
    DIFFICULTIES
        .iter()
        .find(|d| d.eq_ignore_ascii_case(value.trim()))
        .map(|d| (*d).to_string())
        .ok_or_else(|| {
            StoreError::validation(format!(
                "Invalid difficulty '{value}'. Must be one of: {}",
                DIFFICULTIES.join(", ")
            ))
        })
}

fn validate_minutes(field: &str, value: Option<i64>) -> Result<Option<i64>> {
    match value {
        Some(v) if v < 0 => Err(StoreError::validation(format!(
            "{field} cannot be negative"
        ))),
        other => Ok(other),
    }
}

fn blank_to_none(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Check every field of a recipe input and return the normalized copy that
/// gets written: trimmed names, canonical difficulty, blank optionals dropped.
pub fn validate_new_recipe(recipe: &NewRecipe) -> Result<NewRecipe> {
    let name = validate_required("Recipe name", &recipe.name)?;
    let prep_time = validate_minutes("Prep time", recipe.prep_time)?;
    let cook_time = validate_minutes("Cook time", recipe.cook_time)?;
    if let Some(servings) = recipe.servings {
        if servings < 1 {
            return Err(StoreError::validation("Servings must be at least 1"));
        }
    }
    let difficulty = match blank_to_none(recipe.difficulty.as_ref()) {
        Some(d) => Some(validate_difficulty(&d)?),
        None => None,
    };
    let categories = recipe
        .categories
        .iter()
        .map(|c| validate_required("Category name", c))
        .collect::<Result<Vec<_>>>()?;
    let tags = recipe
        .tags
        .iter()
        .map(|t| validate_required("Tag name", t))
        .collect::<Result<Vec<_>>>()?;
    let ingredients = recipe
        .ingredients
        .iter()
        .map(|line| validate_required("Ingredient line", line))
        .collect::<Result<Vec<_>>>()?;

    Ok(NewRecipe {
        name,
        instructions: blank_to_none(recipe.instructions.as_ref()),
        favorite: recipe.favorite,
        description: blank_to_none(recipe.description.as_ref()),
        prep_time,
        cook_time,
        servings: recipe.servings,
        difficulty,
        source: blank_to_none(recipe.source.as_ref()),
        notes: blank_to_none(recipe.notes.as_ref()),
        categories,
        tags,
        ingredients,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required_trims() {
        assert_eq!(validate_required("Name", "  Tea ").unwrap(), "Tea");
    }

    #[test]
    fn test_validate_required_rejects_blank() {
        let err = validate_required("Recipe name", "   ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Recipe name is required");
    }

    #[test]
    fn test_difficulty_case_insensitive() {
        assert_eq!(validate_difficulty("easy").unwrap(), "Easy");
        assert_eq!(validate_difficulty("HARD").unwrap(), "Hard");
        assert_eq!(validate_difficulty(" Medium ").unwrap(), "Medium");
    }

    #[test]
    fn test_difficulty_invalid() {
        assert!(validate_difficulty("impossible").is_err());
        assert!(validate_difficulty("").is_err());
    }

    #[test]
    fn test_validate_new_recipe_normalizes() {
        let input = NewRecipe {
            name: " Pancakes ".to_string(),
            instructions: Some("   ".to_string()),
            difficulty: Some("easy".to_string()),
            categories: vec![" Breakfast".to_string()],
            ingredients: vec!["2 cups flour ".to_string(), "1 egg".to_string()],
            ..NewRecipe::default()
        };
        let valid = validate_new_recipe(&input).unwrap();
        assert_eq!(valid.name, "Pancakes");
        assert!(valid.instructions.is_none());
        assert_eq!(valid.difficulty.as_deref(), Some("Easy"));
        assert_eq!(valid.categories, vec!["Breakfast"]);
        assert_eq!(valid.ingredients, vec!["2 cups flour", "1 egg"]);
    }

    #[test]
    fn test_validate_new_recipe_rejects_blank_parts() {
        assert!(validate_new_recipe(&NewRecipe::named("")).is_err());
        assert!(validate_new_recipe(&NewRecipe::named("Soup").with_categories([""])).is_err());
        assert!(validate_new_recipe(&NewRecipe::named("Soup").with_tags([" "])).is_err());
        assert!(
            validate_new_recipe(&NewRecipe::named("Soup").with_ingredients(["salt", ""])).is_err()
        );
    }

    #[test]
    fn test_validate_new_recipe_numeric_bounds() {
        let mut recipe = NewRecipe::named("Stew");
        recipe.prep_time = Some(-5);
        assert!(validate_new_recipe(&recipe).is_err());

        let mut recipe = NewRecipe::named("Stew");
        recipe.servings = Some(0);
        assert!(validate_new_recipe(&recipe).is_err());

        let mut recipe = NewRecipe::named("Stew");
        recipe.prep_time = Some(0);
        recipe.cook_time = Some(90);
        recipe.servings = Some(4);
        assert!(validate_new_recipe(&recipe).is_ok());
    }

    #[test]
    fn test_import_failure_from_error() {
        let failure =
            ImportFailure::from_error(3, &StoreError::validation("Recipe name is required"));
        assert_eq!(failure.index, 3);
        assert_eq!(failure.kind, ErrorKind::Validation);
        assert_eq!(failure.message, "Recipe name is required");
    }
}
