//! Java recipes.

mod add_annotation;
mod add_time_unit;
mod change_method_name;
mod change_type;
mod find_methods;

pub use add_annotation::{
    AddAutoConfigureTestRestTemplate, AddClassAnnotation, AddClassAnnotationOptions,
};
pub use add_time_unit::{AddTimeUnitArgument, AddTimeUnitArgumentOptions, TimeUnit};
pub use change_method_name::{ChangeMethodName, ChangeMethodNameOptions};
pub use change_type::{ChangeType, ChangeTypeOptions};
pub use find_methods::{FindMethods, FindMethodsOptions};

use graft_core::{ExecutionContext, RecipeError};
use graft_java::{JavaError, TemplateError};

/// Records a skipped template edit as a warning on the current file.
fn skip_edit(ctx: &mut ExecutionContext, recipe: &str, err: &TemplateError) {
    ctx.warn(format!("{recipe} skipped an edit: {err}"));
}

/// Maps a pattern error onto the option that carried the pattern.
fn invalid_pattern(recipe: &str, option: &str, err: &JavaError) -> RecipeError {
    RecipeError::invalid_option(recipe, option, err.to_string())
}
