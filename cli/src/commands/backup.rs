use std::path::Path;

use anyhow::{Result, bail};

use recipebox_core::store::RecipeStore;

use super::helpers::confirm;

const RESTORE_WARNING: &str =
    "Restoring will replace your current database. This cannot be undone. Continue?";

pub(crate) fn cmd_backup(store: &RecipeStore, file: &Path, json: bool) -> Result<()> {
    store.backup_to(file)?;
    if json {
        println!("{}", serde_json::json!({ "backup": file.display().to_string() }));
    } else {
        println!("Database backed up to {}", file.display());
    }
    Ok(())
}

pub(crate) fn cmd_restore(
    store: &mut RecipeStore,
    file: &Path,
    yes: bool,
    json: bool,
) -> Result<()> {
    if !yes && !confirm(RESTORE_WARNING)? {
        bail!("Restore cancelled; nothing was changed");
    }
    store.restore_from(file)?;
    if json {
        println!("{}", serde_json::json!({ "restored": file.display().to_string() }));
    } else {
        println!("Database restored from {}", file.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipebox_core::models::{NewRecipe, RecipeFilter};

    #[test]
    fn test_backup_then_restore_into_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("snapshot.db");

        let mut store = RecipeStore::open(&dir.path().join("live.db")).unwrap();
        store.add_recipe(&NewRecipe::named("Bread")).unwrap();
        cmd_backup(&store, &backup, true).unwrap();

        store.add_recipe(&NewRecipe::named("Cake")).unwrap();
        cmd_restore(&mut store, &backup, true, true).unwrap();

        let recipes = store.list_recipes(&RecipeFilter::default()).unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].name, "Bread");
    }

    #[test]
    fn test_restore_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.db");
        std::fs::write(&empty, b"").unwrap();

        let mut store = RecipeStore::open(&dir.path().join("live.db")).unwrap();
        store.add_recipe(&NewRecipe::named("Bread")).unwrap();
        assert!(cmd_restore(&mut store, &empty, true, false).is_err());
        assert_eq!(store.list_recipes(&RecipeFilter::default()).unwrap().len(), 1);
    }
}
