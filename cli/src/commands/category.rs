use anyhow::Result;

use recipebox_core::store::RecipeStore;

use super::helpers::{exit_empty, print_json, print_label_table};

/// Which label list a `category` or `tag` subcommand works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LabelKind {
    Category,
    Tag,
}

impl LabelKind {
    fn noun(self) -> &'static str {
        match self {
            LabelKind::Category => "category",
            LabelKind::Tag => "tag",
        }
    }

    fn plural(self) -> &'static str {
        match self {
            LabelKind::Category => "categories",
            LabelKind::Tag => "tags",
        }
    }
}

pub(crate) fn cmd_label_list(store: &RecipeStore, kind: LabelKind, json: bool) -> Result<()> {
    let labels = match kind {
        LabelKind::Category => store.list_category_entries()?,
        LabelKind::Tag => store.list_tag_entries()?,
    };
    if labels.is_empty() {
        exit_empty(kind.plural(), json);
    }

    if json {
        return print_json(&labels);
    }
    print_label_table(&labels);
    Ok(())
}

pub(crate) fn cmd_label_add(
    store: &RecipeStore,
    kind: LabelKind,
    name: &str,
    json: bool,
) -> Result<()> {
    let id = match kind {
        LabelKind::Category => store.add_category(name)?,
        LabelKind::Tag => store.add_tag(name)?,
    };
    if json {
        println!("{}", serde_json::json!({ "id": id, "name": name.trim() }));
    } else {
        println!("{} '{}' has id {id}", capitalize(kind.noun()), name.trim());
    }
    Ok(())
}

pub(crate) fn cmd_label_delete(
    store: &RecipeStore,
    kind: LabelKind,
    id: i64,
    json: bool,
) -> Result<()> {
    match kind {
        LabelKind::Category => store.delete_category(id)?,
        LabelKind::Tag => store.delete_tag(id)?,
    }
    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted {} {id}", kind.noun());
    }
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
