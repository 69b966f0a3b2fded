//! Rewrite assertions for recipe tests.
//!
//! [`RewriteTest`] parses the given sources, runs a recipe over them and
//! compares the printed output with the expectation. It then runs the
//! recipe again over its own output and requires that nothing changes, so
//! every rewrite test also checks idempotence.

use std::sync::Arc;

use camino::Utf8Path;
use graft_core::{Recipe, RecipeRun, RecipeRunner, RunConfig, SourceFile};
use graft_java::{Classpath, JavaAttributor};

use crate::sources::parse_source;

/// One input file and what it should look like after the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    path: String,
    before: String,
    after: Option<String>,
}

/// Expects `before` at `path` to become `after`.
#[must_use]
pub fn after(path: &str, before: &str, after: &str) -> SourceSpec {
    SourceSpec {
        path: path.to_owned(),
        before: before.to_owned(),
        after: Some(after.to_owned()),
    }
}

/// Expects the file at `path` to come out untouched.
#[must_use]
pub fn unchanged(path: &str, before: &str) -> SourceSpec {
    SourceSpec {
        path: path.to_owned(),
        before: before.to_owned(),
        after: None,
    }
}

/// A recipe under test together with the classpath and run settings used
/// to exercise it.
#[derive(Clone)]
pub struct RewriteTest {
    recipe: Arc<dyn Recipe>,
    classpath: Arc<Classpath>,
    config: RunConfig,
}

impl RewriteTest {
    /// Tests `recipe` against the JDK baseline, editing files sequentially.
    #[must_use]
    pub fn new(recipe: Arc<dyn Recipe>) -> Self {
        Self {
            recipe,
            classpath: Arc::new(Classpath::jdk()),
            config: RunConfig::default().with_parallel(false),
        }
    }

    /// Adds the types declared in Java stub sources to the classpath.
    ///
    /// # Panics
    ///
    /// Panics when a stub does not parse.
    #[must_use]
    pub fn with_stubs(mut self, stubs: &[&str]) -> Self {
        let classpath = (*self.classpath)
            .clone()
            .with_sources(stubs)
            .unwrap_or_else(|err| panic!("stub sources must parse: {err}"));
        self.classpath = Arc::new(classpath);
        self
    }

    /// Replaces the classpath.
    #[must_use]
    pub fn with_classpath(mut self, classpath: Arc<Classpath>) -> Self {
        self.classpath = classpath;
        self
    }

    /// Replaces the run settings.
    #[must_use]
    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Parses `(path, text)` pairs and runs the recipe once.
    ///
    /// # Panics
    ///
    /// Panics when a source does not parse or the recipe is invalid.
    #[must_use]
    pub fn run(&self, sources: &[(&str, &str)]) -> RecipeRun {
        let files = sources
            .iter()
            .map(|(path, text)| self.parse(path, text))
            .collect();
        self.execute(files)
    }

    /// Runs the recipe, checks every expectation, then checks that a second
    /// run over the output changes nothing.
    ///
    /// # Panics
    ///
    /// Panics when an expectation fails, the run does not converge or the
    /// second run changes anything.
    pub fn rewrite_run(&self, specs: &[SourceSpec]) {
        let files = specs
            .iter()
            .map(|spec| self.parse(&spec.path, &spec.before))
            .collect();
        let run = self.execute(files);
        assert!(
            run.is_converged(),
            "recipe did not converge: {:?}",
            run.diagnostics()
        );
        for (spec, result) in specs.iter().zip(run.results()) {
            match &spec.after {
                Some(expected) => {
                    assert_eq!(
                        result.after().print(),
                        *expected,
                        "unexpected output for {}",
                        spec.path
                    );
                    assert!(result.has_changes(), "{} should have changed", spec.path);
                }
                None => assert!(
                    !result.has_changes(),
                    "{} should be unchanged but became:\n{}",
                    spec.path,
                    result.after().print()
                ),
            }
        }

        let reparsed = run
            .after_sources()
            .iter()
            .map(|file| self.parse(file.path().as_str(), &file.print()))
            .collect();
        let second = self.execute(reparsed);
        if let Some(result) = second.changed().next() {
            panic!(
                "recipe is not idempotent: second run changed {} to:\n{}",
                result.after().path(),
                result.after().print()
            );
        }
    }

    fn parse(&self, path: &str, text: &str) -> Arc<SourceFile> {
        let file = parse_source(Utf8Path::new(path), text, &self.classpath)
            .unwrap_or_else(|err| panic!("{path} must parse: {err}"));
        Arc::new(file)
    }

    fn execute(&self, files: Vec<Arc<SourceFile>>) -> RecipeRun {
        RecipeRunner::new(self.config.clone())
            .with_attributor(Arc::new(JavaAttributor::new(Arc::clone(&self.classpath))))
            .run(&self.recipe, files)
            .unwrap_or_else(|err| panic!("recipe must validate: {err}"))
    }
}
