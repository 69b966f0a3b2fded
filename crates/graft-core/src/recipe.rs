//! Recipe traits.
//!
//! A [`Recipe`] is a configured unit of change. Plain recipes only supply an
//! editor; scanning recipes implement [`ScanningRecipe`] and are adapted with
//! [`Scanning`], which threads a typed accumulator from the read-only scan
//! phase into the edit phase.

use std::any::Any;
use std::sync::Arc;

use crate::error::RecipeError;
use crate::tree::SourceFile;
use crate::visitor::TreeVisitor;

/// Type-erased accumulator owned by one recipe run.
pub type Accumulator = Arc<dyn Any + Send + Sync>;

/// A configured source-to-source transformation.
pub trait Recipe: Send + Sync {
    /// Returns the fully-qualified recipe name.
    fn name(&self) -> &str;

    /// Returns a short human-readable title.
    fn display_name(&self) -> &str {
        self.name()
    }

    /// Returns a longer description.
    fn description(&self) -> &str {
        ""
    }

    /// Checks the recipe options before a run.
    ///
    /// # Errors
    ///
    /// Returns a [`RecipeError`] when an option is missing or malformed.
    fn validate(&self) -> Result<(), RecipeError> {
        Ok(())
    }

    /// Returns the sub-recipes applied after this one.
    fn recipe_list(&self) -> Vec<Arc<dyn Recipe>> {
        Vec::new()
    }

    /// Creates the accumulator for a new run; `None` for recipes that do not
    /// scan.
    fn initial_accumulator(&self) -> Option<Accumulator> {
        None
    }

    /// Returns the read-only visitor that fills `acc`.
    fn scanner<'a>(&'a self, acc: &'a Accumulator) -> Option<Box<dyn TreeVisitor + 'a>> {
        let _ = acc;
        None
    }

    /// Produces new source files from the final accumulator.
    fn generate(&self, acc: &Accumulator) -> Vec<SourceFile> {
        let _ = acc;
        Vec::new()
    }

    /// Returns the visitor that edits each file.
    fn editor<'a>(&'a self, acc: Option<&'a Accumulator>) -> Option<Box<dyn TreeVisitor + 'a>> {
        let _ = acc;
        None
    }
}

/// A recipe with a typed scan phase.
pub trait ScanningRecipe: Send + Sync {
    /// State gathered during the scan phase. Written concurrently, so it
    /// must use thread-safe containers.
    type Acc: Send + Sync + 'static;

    /// Returns the fully-qualified recipe name.
    fn name(&self) -> &str;

    /// Returns a short human-readable title.
    fn display_name(&self) -> &str {
        self.name()
    }

    /// Returns a longer description.
    fn description(&self) -> &str {
        ""
    }

    /// Checks the recipe options before a run.
    ///
    /// # Errors
    ///
    /// Returns a [`RecipeError`] when an option is missing or malformed.
    fn validate(&self) -> Result<(), RecipeError> {
        Ok(())
    }

    /// Creates an empty accumulator.
    fn initial_value(&self) -> Self::Acc;

    /// Returns the read-only visitor that fills `acc`.
    fn scanner<'a>(&'a self, acc: &'a Self::Acc) -> Box<dyn TreeVisitor + 'a>;

    /// Produces new source files from the final accumulator.
    fn generate(&self, acc: &Self::Acc) -> Vec<SourceFile> {
        let _ = acc;
        Vec::new()
    }

    /// Returns the visitor that edits each file using the final accumulator.
    fn editor<'a>(&'a self, acc: &'a Self::Acc) -> Option<Box<dyn TreeVisitor + 'a>>;
}

/// Adapts a [`ScanningRecipe`] into a [`Recipe`].
#[derive(Debug, Clone)]
pub struct Scanning<R>(pub R);

impl<R: ScanningRecipe> Scanning<R> {
    fn typed<'a>(acc: &'a Accumulator) -> Option<&'a R::Acc> {
        acc.downcast_ref::<R::Acc>()
    }
}

impl<R: ScanningRecipe> Recipe for Scanning<R> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn display_name(&self) -> &str {
        self.0.display_name()
    }

    fn description(&self) -> &str {
        self.0.description()
    }

    fn validate(&self) -> Result<(), RecipeError> {
        self.0.validate()
    }

    fn initial_accumulator(&self) -> Option<Accumulator> {
        Some(Arc::new(self.0.initial_value()))
    }

    fn scanner<'a>(&'a self, acc: &'a Accumulator) -> Option<Box<dyn TreeVisitor + 'a>> {
        Self::typed(acc).map(|typed| self.0.scanner(typed))
    }

    fn generate(&self, acc: &Accumulator) -> Vec<SourceFile> {
        Self::typed(acc).map_or_else(Vec::new, |typed| self.0.generate(typed))
    }

    fn editor<'a>(&'a self, acc: Option<&'a Accumulator>) -> Option<Box<dyn TreeVisitor + 'a>> {
        acc.and_then(Self::typed).and_then(|typed| self.0.editor(typed))
    }
}
