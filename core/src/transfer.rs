use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{Result, StoreError};
use crate::models::{
    ImportFailure, ImportReport, NewRecipe, validate_new_recipe, validate_required,
};
use crate::store::{RecipeStore, insert_item, insert_recipe, insert_shopping_list};

/// One recipe in the JSON interchange format.
///
/// Unknown keys, including `id`, are ignored when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<RecipeRecord> for NewRecipe {
    fn from(record: RecipeRecord) -> Self {
        NewRecipe {
            name: record.name,
            instructions: record.instructions,
            favorite: record.favorite,
            description: record.description,
            prep_time: record.prep_time,
            cook_time: record.cook_time,
            servings: record.servings,
            difficulty: record.difficulty,
            source: record.source,
            notes: record.notes,
            categories: record.categories,
            tags: record.tags,
            ingredients: record.ingredients,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<ShoppingItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItemRecord {
    pub item_text: String,
    #[serde(default)]
    pub checked: bool,
}

/// Decode a JSON array of records, failing on the first structural problem.
fn parse_records<T: DeserializeOwned>(json: &str, what: &str) -> Result<Vec<T>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| StoreError::Format(format!("not valid JSON: {e}")))?;
    let Value::Array(elements) = value else {
        return Err(StoreError::Format(format!("expected an array of {what}")));
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| -> Result<T> {
            if !element.is_object() {
                return Err(StoreError::Format(format!("record {index} is not an object")));
            }
            serde_json::from_value(element)
                .map_err(|e| StoreError::Format(format!("record {index}: {e}")))
        })
        .collect()
}

pub fn parse_recipe_records(json: &str) -> Result<Vec<RecipeRecord>> {
    parse_records(json, "recipes")
}

pub fn parse_shopping_list_records(json: &str) -> Result<Vec<ShoppingListRecord>> {
    parse_records(json, "shopping lists")
}

fn validate_shopping_list_record(
    record: &ShoppingListRecord,
) -> Result<(String, Vec<(String, bool)>)> {
    let name = validate_required("Shopping list name", &record.name)?;
    let items = record
        .items
        .iter()
        .map(|item| -> Result<(String, bool)> {
            Ok((validate_required("Item text", &item.item_text)?, item.checked))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((name, items))
}

impl RecipeStore {
    /// Insert every valid record as a new recipe, skipping the rest.
    pub fn import_recipes(&self, records: &[RecipeRecord]) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        let tx = self.conn.unchecked_transaction()?;

        for (index, record) in records.iter().enumerate() {
            let recipe = match validate_new_recipe(&NewRecipe::from(record.clone())) {
                Ok(recipe) => recipe,
                Err(err) => {
                    warn!(index, error = %err, "skipping recipe record");
                    report.failures.push(ImportFailure::from_error(index, &err));
                    continue;
                }
            };
            insert_recipe(&tx, &recipe)?;
            report.imported += 1;
        }

        tx.commit()?;
        info!(
            imported = report.imported,
            skipped = report.failures.len(),
            "imported recipes"
        );
        Ok(report)
    }

    pub fn import_shopping_lists(&self, records: &[ShoppingListRecord]) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        let tx = self.conn.unchecked_transaction()?;

        for (index, record) in records.iter().enumerate() {
            let (name, items) = match validate_shopping_list_record(record) {
                Ok(valid) => valid,
                Err(err) => {
                    warn!(index, error = %err, "skipping shopping list record");
                    report.failures.push(ImportFailure::from_error(index, &err));
                    continue;
                }
            };
            let list_id = insert_shopping_list(&tx, &name, record.notes.as_deref())?;
            for (text, checked) in &items {
                insert_item(&tx, list_id, text, *checked)?;
            }
            report.imported += 1;
        }

        tx.commit()?;
        info!(
            imported = report.imported,
            skipped = report.failures.len(),
            "imported shopping lists"
        );
        Ok(report)
    }

    pub fn import_recipes_json(&self, json: &str) -> Result<ImportReport> {
        let records = parse_recipe_records(json)?;
        self.import_recipes(&records)
    }

    pub fn import_shopping_lists_json(&self, json: &str) -> Result<ImportReport> {
        let records = parse_shopping_list_records(json)?;
        self.import_shopping_lists(&records)
    }

    /// Records for the given recipes in the given order, or every recipe by id.
    pub fn export_recipes(&self, ids: Option<&[i64]>) -> Result<Vec<RecipeRecord>> {
        let ids = match ids {
            Some(ids) => ids.to_vec(),
            None => self.recipe_ids()?,
        };

        ids.into_iter()
            .map(|id| -> Result<RecipeRecord> {
                let detail = self.get_recipe_detail(id)?;
                let recipe = detail.recipe;
                Ok(RecipeRecord {
                    name: recipe.name,
                    instructions: recipe.instructions,
                    favorite: recipe.favorite,
                    categories: detail.categories,
                    ingredients: detail.ingredients.into_iter().map(|i| i.text).collect(),
                    tags: detail.tags,
                    description: recipe.description,
                    prep_time: recipe.prep_time,
                    cook_time: recipe.cook_time,
                    servings: recipe.servings,
                    difficulty: recipe.difficulty,
                    source: recipe.source,
                    notes: recipe.notes,
                })
            })
            .collect()
    }

    pub fn export_shopping_lists(&self, ids: Option<&[i64]>) -> Result<Vec<ShoppingListRecord>> {
        let ids = match ids {
            Some(ids) => ids.to_vec(),
            None => self.shopping_list_ids()?,
        };

        ids.into_iter()
            .map(|id| -> Result<ShoppingListRecord> {
                let detail = self.get_shopping_list(id)?;
                Ok(ShoppingListRecord {
                    name: detail.list.name,
                    notes: detail.list.notes,
                    items: detail
                        .items
                        .into_iter()
                        .map(|item| ShoppingItemRecord {
                            item_text: item.text,
                            checked: item.checked,
                        })
                        .collect(),
                })
            })
            .collect()
    }

    pub fn export_recipes_json(&self, ids: Option<&[i64]>) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export_recipes(ids)?)?)
    }

    pub fn export_shopping_lists_json(&self, ids: Option<&[i64]>) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export_shopping_lists(ids)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::RecipeFilter;

    fn recipe_count(store: &RecipeStore) -> usize {
        store.list_recipes(&RecipeFilter::default()).unwrap().len()
    }

    #[test]
    fn test_import_partial_success() {
        let store = RecipeStore::open_in_memory().unwrap();
        let report = store
            .import_recipes_json(
                r#"[{"name":"Tea","categories":["Drink"]},{"name":"","categories":[]}]"#,
            )
            .unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[0].kind, ErrorKind::Validation);

        let recipes = store.list_recipes(&RecipeFilter::default()).unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].name, "Tea");
        assert!(store.list_categories().unwrap().contains(&"Drink".to_string()));
    }

    #[test]
    fn test_import_ignores_ids() {
        let store = RecipeStore::open_in_memory().unwrap();
        let existing = store.add_recipe(&NewRecipe::named("Original")).unwrap();

        let json = format!(r#"[{{"id": {existing}, "name": "Intruder"}}]"#);
        let report = store.import_recipes_json(&json).unwrap();
        assert_eq!(report.imported, 1);

        assert_eq!(store.get_recipe(existing).unwrap().name, "Original");
        assert_eq!(recipe_count(&store), 2);
    }

    #[test]
    fn test_export_then_import_doubles() {
        let store = RecipeStore::open_in_memory().unwrap();
        store
            .add_recipe(
                &NewRecipe::named("Pancakes")
                    .with_categories(["Breakfast"])
                    .with_ingredients(["flour", "eggs"]),
            )
            .unwrap();
        store.add_recipe(&NewRecipe::named("Tea")).unwrap();

        let json = store.export_recipes_json(None).unwrap();
        let report = store.import_recipes_json(&json).unwrap();
        assert_eq!(report.imported, 2);
        assert!(report.failures.is_empty());
        assert_eq!(recipe_count(&store), 4);
    }

    #[test]
    fn test_export_omits_ids_and_absent_optionals() {
        let store = RecipeStore::open_in_memory().unwrap();
        let id = store
            .add_recipe(&NewRecipe::named("Toast").with_ingredients(["bread"]))
            .unwrap();

        let json = store.export_recipes_json(Some([id].as_slice())).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let record = &value[0];
        assert!(record.get("id").is_none());
        assert!(record.get("instructions").is_none());
        assert_eq!(record["name"], "Toast");
        assert_eq!(record["favorite"], false);
        assert_eq!(record["ingredients"], serde_json::json!(["bread"]));
        assert_eq!(record["categories"], serde_json::json!([]));
    }

    #[test]
    fn test_export_in_given_order() {
        let store = RecipeStore::open_in_memory().unwrap();
        let a = store.add_recipe(&NewRecipe::named("A")).unwrap();
        let b = store.add_recipe(&NewRecipe::named("B")).unwrap();

        let records = store.export_recipes(Some([b, a].as_slice())).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);

        let err = store.export_recipes(Some([a, b + 10].as_slice())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_format_errors_write_nothing() {
        let store = RecipeStore::open_in_memory().unwrap();
        let bad_inputs = [
            "not json",
            r#"{"name":"Tea"}"#,
            r#"[{"name":"Tea"}, 5]"#,
            r#"[{"name":"Tea"}, {"categories":[]}]"#,
            r#"[{"name":"Tea"}, {"name":"Soup","favorite":"yes"}]"#,
        ];
        for input in bad_inputs {
            let err = store.import_recipes_json(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format, "input: {input}");
        }
        assert_eq!(recipe_count(&store), 0);
    }

    #[test]
    fn test_format_error_names_record() {
        let err = parse_recipe_records(r#"[{"name":"Tea"}, "soup"]"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid import data: record 1 is not an object");
    }

    #[test]
    fn test_import_empty_array() {
        let store = RecipeStore::open_in_memory().unwrap();
        let report = store.import_recipes_json("[]").unwrap();
        assert_eq!(report.imported, 0);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_import_recipe_with_blank_ingredient_skipped() {
        let store = RecipeStore::open_in_memory().unwrap();
        let report = store
            .import_recipes_json(r#"[{"name":"Soup","ingredients":["water",""]},{"name":"Bread"}]"#)
            .unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.failures[0].index, 0);
        assert_eq!(store.list_recipes(&RecipeFilter::default()).unwrap()[0].name, "Bread");
    }

    #[test]
    fn test_shopping_list_import() {
        let store = RecipeStore::open_in_memory().unwrap();
        let json = r#"[
            {"id": 9, "name": "Weekly", "items": [
                {"id": 3, "item_text": "eggs", "checked": true},
                {"item_text": "milk"}
            ]},
            {"name": "Empty"},
            {"name": " ", "items": []}
        ]"#;
        let report = store.import_shopping_lists_json(json).unwrap();
        assert_eq!(report.imported, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 2);

        let lists = store.list_shopping_lists().unwrap();
        assert_eq!(lists.len(), 2);
        let weekly = lists.iter().find(|l| l.name == "Weekly").unwrap();
        assert_eq!(weekly.item_count, 2);
        assert_eq!(weekly.checked_count, 1);
    }

    #[test]
    fn test_shopping_list_item_missing_text_is_format_error() {
        let store = RecipeStore::open_in_memory().unwrap();
        let err = store
            .import_shopping_lists_json(r#"[{"name":"A","items":[{"checked":true}]}]"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(store.list_shopping_lists().unwrap().is_empty());
    }

    #[test]
    fn test_shopping_list_export_round_trip() {
        let store = RecipeStore::open_in_memory().unwrap();
        let list = store.add_shopping_list("Party", Some("Saturday")).unwrap();
        let chips = store.add_shopping_list_item(list, "chips").unwrap();
        store.add_shopping_list_item(list, "salsa").unwrap();
        store.set_item_checked(chips, true).unwrap();

        let exported = store.export_shopping_lists(None).unwrap();
        assert_eq!(
            exported,
            vec![ShoppingListRecord {
                name: "Party".to_string(),
                notes: Some("Saturday".to_string()),
                items: vec![
                    ShoppingItemRecord {
                        item_text: "chips".to_string(),
                        checked: true,
                    },
                    ShoppingItemRecord {
                        item_text: "salsa".to_string(),
                        checked: false,
                    },
                ],
            }]
        );

        let json = store.export_shopping_lists_json(None).unwrap();
        store.import_shopping_lists_json(&json).unwrap();
        assert_eq!(store.list_shopping_lists().unwrap().len(), 2);
    }
}
