mod backup;
mod category;
mod helpers;
mod recipe;
mod shopping;
mod transfer;

pub(crate) use backup::{cmd_backup, cmd_restore};
pub(crate) use category::{LabelKind, cmd_label_add, cmd_label_delete, cmd_label_list};
pub(crate) use helpers::json_error;
pub(crate) use recipe::{
    RecipeArgs, cmd_recipe_add, cmd_recipe_delete, cmd_recipe_list, cmd_recipe_show,
    cmd_recipe_update,
};
pub(crate) use shopping::{
    cmd_list_add_item, cmd_list_delete, cmd_list_edit_item, cmd_list_generate, cmd_list_list,
    cmd_list_new, cmd_list_remove_item, cmd_list_rename, cmd_list_set_checked, cmd_list_show,
};
pub(crate) use transfer::{Collection, cmd_export, cmd_import};
