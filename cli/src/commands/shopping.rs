use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use recipebox_core::store::RecipeStore;

use super::helpers::{check_mark, exit_empty, print_json, truncate};

pub(crate) fn cmd_list_new(
    store: &RecipeStore,
    name: &str,
    notes: Option<&str>,
    json: bool,
) -> Result<()> {
    let id = store.add_shopping_list(name, notes)?;
    if json {
        print_json(&store.get_shopping_list(id)?)?;
    } else {
        println!("Created shopping list: {} (id: {id})", name.trim());
        println!("Add items with: recipebox list add-item {id} <text>");
    }
    Ok(())
}

pub(crate) fn cmd_list_show(store: &RecipeStore, id: i64, json: bool) -> Result<()> {
    let detail = store.get_shopping_list(id)?;

    if json {
        return print_json(&detail);
    }

    let done = detail.items.iter().filter(|i| i.checked).count();
    println!("=== {} ===", detail.list.name);
    if let Some(ref notes) = detail.list.notes {
        println!("  {notes}");
    }
    println!("  {done}/{} checked\n", detail.items.len());
    if detail.items.is_empty() {
        println!("  (no items)");
    }
    for item in &detail.items {
        println!("  {} {:>4}  {}", check_mark(item.checked), item.id, item.text);
    }
    Ok(())
}

pub(crate) fn cmd_list_list(store: &RecipeStore, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct ListRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Items")]
        items: i64,
        #[tabled(rename = "Checked")]
        checked: i64,
        #[tabled(rename = "Created")]
        created: String,
    }

    let lists = store.list_shopping_lists()?;
    if lists.is_empty() {
        exit_empty("shopping lists", json);
    }

    if json {
        return print_json(&lists);
    }

    let rows: Vec<ListRow> = lists
        .iter()
        .map(|l| ListRow {
            id: l.id,
            name: truncate(&l.name, 35),
            items: l.item_count,
            checked: l.checked_count,
            created: l.created_at.chars().take(10).collect(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_list_rename(
    store: &RecipeStore,
    id: i64,
    name: &str,
    notes: Option<&str>,
    json: bool,
) -> Result<()> {
    store.update_shopping_list(id, name, notes)?;
    if json {
        print_json(&store.get_shopping_list(id)?)?;
    } else {
        println!("Updated shopping list {id}");
    }
    Ok(())
}

pub(crate) fn cmd_list_delete(store: &RecipeStore, id: i64, json: bool) -> Result<()> {
    store.delete_shopping_list(id)?;
    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted shopping list {id}");
    }
    Ok(())
}

pub(crate) fn cmd_list_generate(
    store: &RecipeStore,
    recipe_ids: &[i64],
    name: Option<&str>,
    json: bool,
) -> Result<()> {
    let id = store.generate_shopping_list_from_recipes(recipe_ids, name)?;
    let detail = store.get_shopping_list(id)?;
    if json {
        print_json(&detail)?;
    } else {
        println!(
            "Generated shopping list: {} (id: {id}, {} items)",
            detail.list.name,
            detail.items.len()
        );
    }
    Ok(())
}

pub(crate) fn cmd_list_add_item(
    store: &RecipeStore,
    list_id: i64,
    text: &str,
    json: bool,
) -> Result<()> {
    let id = store.add_shopping_list_item(list_id, text)?;
    if json {
        println!("{}", serde_json::json!({ "id": id, "text": text.trim() }));
    } else {
        println!("Added item {id} to list {list_id}");
    }
    Ok(())
}

pub(crate) fn cmd_list_set_checked(
    store: &RecipeStore,
    item_id: i64,
    checked: bool,
    json: bool,
) -> Result<()> {
    store.set_item_checked(item_id, checked)?;
    if json {
        println!("{}", serde_json::json!({ "id": item_id, "checked": checked }));
    } else {
        let verb = if checked { "Checked" } else { "Unchecked" };
        println!("{verb} item {item_id}");
    }
    Ok(())
}

pub(crate) fn cmd_list_edit_item(
    store: &RecipeStore,
    item_id: i64,
    text: &str,
    json: bool,
) -> Result<()> {
    store.update_item_text(item_id, text)?;
    if json {
        println!("{}", serde_json::json!({ "id": item_id, "text": text.trim() }));
    } else {
        println!("Updated item {item_id}");
    }
    Ok(())
}

pub(crate) fn cmd_list_remove_item(store: &RecipeStore, item_id: i64, json: bool) -> Result<()> {
    store.delete_item(item_id)?;
    if json {
        println!("{}", serde_json::json!({ "deleted": item_id }));
    } else {
        println!("Removed item {item_id}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipebox_core::models::NewRecipe;

    #[test]
    fn test_generate_from_recipes() {
        let store = RecipeStore::open_in_memory().unwrap();
        let id = store
            .add_recipe(&NewRecipe::named("Salad").with_ingredients(["lettuce", "tomato"]))
            .unwrap();
        cmd_list_generate(&store, &[id], Some("Lunch"), true).unwrap();

        let lists = store.list_shopping_lists().unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].name, "Lunch");
        assert_eq!(lists[0].item_count, 2);
    }

    #[test]
    fn test_item_lifecycle() {
        let store = RecipeStore::open_in_memory().unwrap();
        let list = store.add_shopping_list("Groceries", None).unwrap();
        cmd_list_add_item(&store, list, "eggs", true).unwrap();
        let item = store.get_shopping_list(list).unwrap().items[0].id;

        cmd_list_set_checked(&store, item, true, true).unwrap();
        cmd_list_edit_item(&store, item, "a dozen eggs", true).unwrap();
        let detail = store.get_shopping_list(list).unwrap();
        assert!(detail.items[0].checked);
        assert_eq!(detail.items[0].text, "a dozen eggs");

        cmd_list_remove_item(&store, item, true).unwrap();
        assert!(cmd_list_remove_item(&store, item, true).is_err());
    }
}
