//! Recipe execution: scan, generate and edit cycles to a fixed point.
//!
//! A run flattens the recipe closure (each recipe instance once), creates
//! accumulators, then repeats cycles. Each cycle scans every file with every
//! scanning recipe, generates new files (first cycle only), and edits every
//! file with every recipe in order. Files are edited independently, in
//! parallel when configured; the end of a cycle is a join point where the
//! fixed-point check happens.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::context::{AfterVisit, ExecutionContext};
use crate::diagnostic::{Diagnostic, DiagnosticCode, DiagnosticReport};
use crate::error::RecipeError;
use crate::language::Language;
use crate::recipe::{Accumulator, Recipe};
use crate::tree::{Node, SourceFile};
use crate::visitor::visit_file;

/// Recomputes type information for a file after it changed.
pub trait TypeAttributor: Send + Sync {
    /// Returns the language this attributor handles.
    fn language(&self) -> Language;

    /// Returns the attributed root for `file`.
    ///
    /// Nodes whose attribution does not change should be returned as the
    /// same [`Arc`].
    fn attribute(&self, file: &SourceFile) -> Arc<Node>;
}

/// Outcome for one file.
#[derive(Debug, Clone)]
pub struct FileResult {
    before: Option<Arc<SourceFile>>,
    after: Arc<SourceFile>,
    recipes: Vec<String>,
    warnings: Vec<String>,
}

impl FileResult {
    /// Returns the input file, or `None` for generated files.
    #[must_use]
    pub const fn before(&self) -> Option<&Arc<SourceFile>> {
        self.before.as_ref()
    }

    /// Returns the output file.
    #[must_use]
    pub const fn after(&self) -> &Arc<SourceFile> {
        &self.after
    }

    /// Returns the names of recipes that changed the file, in first-change
    /// order.
    #[must_use]
    pub fn recipes(&self) -> &[String] {
        &self.recipes
    }

    /// Returns skipped-edit warnings followed by warning markers in the
    /// output tree.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Returns whether the output differs from the input.
    ///
    /// Unchanged files are the very same [`Arc`] as the input.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.before
            .as_ref()
            .is_none_or(|before| !Arc::ptr_eq(before, &self.after))
    }
}

/// Result of a complete run.
#[derive(Debug, Clone)]
pub struct RecipeRun {
    results: Vec<FileResult>,
    cycles: usize,
    diagnostics: Vec<Diagnostic>,
}

impl RecipeRun {
    /// Returns one result per input file, in input order, followed by
    /// generated files.
    #[must_use]
    pub fn results(&self) -> &[FileResult] {
        &self.results
    }

    /// Iterates over the results with changes.
    pub fn changed(&self) -> impl Iterator<Item = &FileResult> {
        self.results.iter().filter(|result| result.has_changes())
    }

    /// Returns the output files in result order.
    #[must_use]
    pub fn after_sources(&self) -> Vec<Arc<SourceFile>> {
        self.results
            .iter()
            .map(|result| Arc::clone(&result.after))
            .collect()
    }

    /// Returns the number of cycles executed.
    #[must_use]
    pub const fn cycles(&self) -> usize {
        self.cycles
    }

    /// Returns the run diagnostics.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns whether the run reached a fixed point.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        !self
            .diagnostics
            .iter()
            .any(|d| d.code() == DiagnosticCode::NonConvergence)
    }

    /// Converts the diagnostics into an error when there are any.
    ///
    /// # Errors
    ///
    /// Returns a [`DiagnosticReport`] holding every diagnostic.
    pub fn check(&self) -> Result<(), DiagnosticReport> {
        if self.diagnostics.is_empty() {
            Ok(())
        } else {
            Err(DiagnosticReport::new(self.diagnostics.clone()))
        }
    }
}

struct FileState {
    before: Option<Arc<SourceFile>>,
    current: Arc<SourceFile>,
    recipes: Vec<String>,
    warnings: Vec<String>,
    carried: Vec<AfterVisit>,
}

impl FileState {
    fn new(before: Option<Arc<SourceFile>>, current: Arc<SourceFile>) -> Self {
        Self {
            before,
            current,
            recipes: Vec::new(),
            warnings: Vec::new(),
            carried: Vec::new(),
        }
    }

    fn record(&mut self, name: &str) {
        if !self.recipes.iter().any(|known| known == name) {
            self.recipes.push(name.to_owned());
        }
    }

    fn into_result(self) -> FileResult {
        let mut warnings = self.warnings;
        warnings.extend(self.current.warnings());
        FileResult {
            before: self.before,
            after: self.current,
            recipes: self.recipes,
            warnings,
        }
    }
}

type ActiveRecipe = (Arc<dyn Recipe>, Option<Accumulator>);

/// Executes recipes over a set of source files.
#[derive(Default)]
pub struct RecipeRunner {
    config: RunConfig,
    attributors: Vec<Arc<dyn TypeAttributor>>,
}

impl RecipeRunner {
    /// Creates a runner.
    #[must_use]
    pub const fn new(config: RunConfig) -> Self {
        Self {
            config,
            attributors: Vec::new(),
        }
    }

    /// Registers an attributor that refreshes type information after edits.
    #[must_use]
    pub fn with_attributor(mut self, attributor: Arc<dyn TypeAttributor>) -> Self {
        self.attributors.push(attributor);
        self
    }

    /// Returns the run configuration.
    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs `recipe` and its sub-recipes over `sources`.
    ///
    /// # Errors
    ///
    /// Returns a [`RecipeError`] when any recipe in the closure fails
    /// validation; no file is touched in that case.
    pub fn run(
        &self,
        recipe: &Arc<dyn Recipe>,
        sources: Vec<Arc<SourceFile>>,
    ) -> Result<RecipeRun, RecipeError> {
        let recipes = flatten(recipe);
        for candidate in &recipes {
            candidate.validate()?;
        }
        let active: Vec<ActiveRecipe> = recipes
            .into_iter()
            .map(|recipe| {
                let acc = recipe.initial_accumulator();
                (recipe, acc)
            })
            .collect();

        info!(
            recipe = recipe.name(),
            recipes = active.len(),
            files = sources.len(),
            "starting recipe run"
        );

        let mut states: Vec<FileState> = sources
            .into_iter()
            .map(|file| FileState::new(Some(Arc::clone(&file)), file))
            .collect();
        let mut diagnostics = Vec::new();
        let mut cycles = 0;
        let max_cycles = self.config.max_cycles().max(1);

        for cycle in 1..=max_cycles {
            cycles = cycle;
            self.scan(&active, &states, cycle);
            if cycle == 1 {
                states.extend(generate(&active).into_iter().map(|file| {
                    FileState::new(None, Arc::new(file))
                }));
            }

            let changed_by = self.edit(&active, &mut states, cycle);
            let pending = states.iter().any(|state| !state.carried.is_empty());
            debug!(cycle, changed = changed_by.len(), pending, "cycle finished");

            if changed_by.is_empty() && !pending {
                break;
            }
            if cycle == max_cycles {
                let dropped = drop_follow_ups(&mut states);
                if dropped > 0 {
                    warn!(cycle, dropped, "dropping follow-up visitors deferred past the last cycle");
                }
                if !changed_by.is_empty() {
                    warn!(cycle, recipes = ?changed_by, "recipe run did not converge");
                    diagnostics.push(non_convergence(max_cycles, changed_by));
                }
            }
        }

        let results: Vec<FileResult> = states.into_iter().map(FileState::into_result).collect();
        info!(
            cycles,
            changed = results.iter().filter(|r| r.has_changes()).count(),
            "finished recipe run"
        );
        Ok(RecipeRun {
            results,
            cycles,
            diagnostics,
        })
    }

    fn scan(&self, active: &[ActiveRecipe], states: &[FileState], cycle: usize) {
        let files: Vec<Arc<SourceFile>> = states
            .iter()
            .map(|state| Arc::clone(&state.current))
            .collect();
        for (recipe, acc) in active {
            let Some(acc) = acc else { continue };
            let scan_one = |file: &Arc<SourceFile>| {
                if let Some(mut scanner) = recipe.scanner(acc) {
                    let mut ctx = ExecutionContext::for_file(file, cycle);
                    if !scanner.is_acceptable(file, &ctx) {
                        return;
                    }
                    // Scanners are read-only; their output is discarded.
                    let _scanned = visit_file(scanner.as_mut(), file, &mut ctx);
                }
            };
            if self.config.parallel() {
                files.par_iter().for_each(scan_one);
            } else {
                files.iter().for_each(scan_one);
            }
        }
    }

    fn edit(&self, active: &[ActiveRecipe], states: &mut [FileState], cycle: usize) -> Vec<String> {
        let per_file: Vec<Vec<String>> = if self.config.parallel() {
            states
                .par_iter_mut()
                .map(|state| self.edit_file(active, state, cycle))
                .collect()
        } else {
            states
                .iter_mut()
                .map(|state| self.edit_file(active, state, cycle))
                .collect()
        };

        let mut changed_by: Vec<String> = Vec::new();
        for name in per_file.into_iter().flatten() {
            if !changed_by.contains(&name) {
                changed_by.push(name);
            }
        }
        changed_by
    }

    fn edit_file(&self, active: &[ActiveRecipe], state: &mut FileState, cycle: usize) -> Vec<String> {
        let mut changed_by = Vec::new();
        let mut ctx = ExecutionContext::for_file(&state.current, cycle);

        ctx.resume(std::mem::take(&mut state.carried));
        let resumed = ctx.drain_after_visits(&state.current);
        if !Arc::ptr_eq(&resumed, &state.current) {
            changed_by.push("deferred follow-up".to_owned());
            state.current = self.reattribute(&resumed);
        }

        for (recipe, acc) in active {
            let Some(mut editor) = recipe.editor(acc.as_ref()) else {
                continue;
            };
            if !editor.is_acceptable(&state.current, &ctx) {
                continue;
            }
            let visited = visit_file(editor.as_mut(), &state.current, &mut ctx);
            drop(editor);
            let drained = ctx.drain_after_visits(&visited);
            if !Arc::ptr_eq(&drained, &state.current) {
                debug!(path = %state.current.path(), recipe = recipe.name(), cycle, "file changed");
                state.record(recipe.name());
                changed_by.push(recipe.name().to_owned());
                state.current = self.reattribute(&drained);
            }
        }

        state.warnings.extend(ctx.take_warnings());
        state.carried = ctx.take_deferred();
        changed_by
    }

    fn reattribute(&self, file: &Arc<SourceFile>) -> Arc<SourceFile> {
        self.attributors
            .iter()
            .find(|attributor| attributor.language() == file.language())
            .map_or_else(
                || Arc::clone(file),
                |attributor| Arc::new(file.with_root(attributor.attribute(file))),
            )
    }
}

fn flatten(root: &Arc<dyn Recipe>) -> Vec<Arc<dyn Recipe>> {
    fn visit(recipe: &Arc<dyn Recipe>, out: &mut Vec<Arc<dyn Recipe>>) {
        if out.iter().any(|known| Arc::ptr_eq(known, recipe)) {
            return;
        }
        out.push(Arc::clone(recipe));
        for child in recipe.recipe_list() {
            visit(&child, out);
        }
    }
    let mut out = Vec::new();
    visit(root, &mut out);
    out
}

fn drop_follow_ups(states: &mut [FileState]) -> usize {
    let mut dropped = 0;
    for state in states {
        for request in std::mem::take(&mut state.carried) {
            dropped += 1;
            state.warnings.push(format!(
                "follow-up {} was still pending after the last cycle",
                request.key()
            ));
        }
    }
    dropped
}

fn generate(active: &[ActiveRecipe]) -> Vec<SourceFile> {
    active
        .iter()
        .filter_map(|(recipe, acc)| acc.as_ref().map(|acc| recipe.generate(acc)))
        .flatten()
        .collect()
}

fn non_convergence(max_cycles: usize, recipes: Vec<String>) -> Diagnostic {
    Diagnostic::new(
        DiagnosticCode::NonConvergence,
        format!(
            "files were still changing after {max_cycles} cycles; changed in the last cycle by: {}",
            recipes.join(", ")
        ),
        None,
        recipes,
    )
}
