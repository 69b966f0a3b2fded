//! End-to-end tests for graft-recipes using insta for snapshot testing.
//!
//! These tests drive the public API the way an embedding tool would: build
//! recipes from the registry, parse a mixed project, run to a fixed point
//! and print the results.

use std::sync::Arc;

use camino::Utf8Path;
use graft_core::{
    Accumulator, Cursor, DiagnosticCode, ExecutionContext, Node, Recipe, RecipeRun, RecipeRunner,
    RunConfig, TreeVisitor, walk_children,
};
use graft_java::{Classpath, JavaAttributor};
use graft_recipes::{CatalogError, RecipeRegistry, SourceError, parse_sources};
use insta::{assert_debug_snapshot, assert_snapshot};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const CLIENT: &str = "package com.acme;\npublic class Client {\n    public void send(int timeout) {}\n    public void send(long timeout, java.util.concurrent.TimeUnit unit) {}\n}\n";

const PROJECT: [(&str, &str); 4] = [
    (
        "src/main/java/com/acme/Job.java",
        "package com.acme;\n\nclass Job {\n    void run(Client client) {\n        client.send(250);\n    }\n}\n",
    ),
    (
        "pom.xml",
        "<project>\n  <version>1.0</version>\n</project>\n",
    ),
    (
        "src/main/resources/application.yml",
        "client:\n  timeout: 250 # ms\n",
    ),
    (
        "src/main/resources/application.properties",
        "client.timeout=250\n",
    ),
];

const MIGRATION: &str = "\
type: specs.openrewrite.org/v1beta/recipe
name: com.acme.MigrateClient
displayName: Migrate the client
recipeList:
  - graft.java.AddTimeUnitArgument:
      methodPattern: com.acme.Client send(int)
  - graft.xml.ChangeTagValue:
      elementName: /project/version
      newValue: '2.0'
  - graft.properties.ChangePropertyKey:
      oldPropertyKey: client.timeout
      newPropertyKey: client.timeout-millis
";

#[fixture]
fn classpath() -> Arc<Classpath> {
    let classpath = Classpath::jdk()
        .with_sources(&[CLIENT])
        .unwrap_or_else(|err| panic!("stubs: {err}"));
    Arc::new(classpath)
}

fn run(recipe: &Arc<dyn Recipe>, classpath: &Arc<Classpath>, parallel: bool) -> RecipeRun {
    let (files, skipped) = parse_sources(
        PROJECT
            .iter()
            .map(|(path, text)| (Utf8Path::new(path), *text)),
        classpath,
    );
    assert!(skipped.is_empty(), "every project file parses: {skipped:?}");
    RecipeRunner::new(RunConfig::default().with_parallel(parallel))
        .with_attributor(Arc::new(JavaAttributor::new(Arc::clone(classpath))))
        .run(recipe, files)
        .unwrap_or_else(|err| panic!("recipe validates: {err}"))
}

fn printed(run: &RecipeRun) -> String {
    run.results()
        .iter()
        .map(|result| format!("--- {}\n{}", result.after().path(), result.after().print()))
        .collect()
}

fn migrate(classpath: &Arc<Classpath>, parallel: bool) -> String {
    let mut registry = RecipeRegistry::with_catalog();
    registry
        .load_declarative(MIGRATION)
        .unwrap_or_else(|err| panic!("documents: {err}"));
    let recipe = registry
        .create("com.acme.MigrateClient", Value::Null)
        .unwrap_or_else(|err| panic!("composite: {err}"));

    let outcome = run(&recipe, classpath, parallel);
    assert!(outcome.is_converged());
    assert_eq!(outcome.changed().count(), 4);
    printed(&outcome)
}

#[rstest]
fn declarative_migration_rewrites_a_mixed_project(classpath: Arc<Classpath>) {
    assert_snapshot!(migrate(&classpath, false), @r"
    --- src/main/java/com/acme/Job.java
    package com.acme;

    import java.util.concurrent.TimeUnit;

    class Job {
        void run(Client client) {
            client.send(250, TimeUnit.MILLISECONDS);
        }
    }
    --- pom.xml
    <project>
      <version>2.0</version>
    </project>
    --- src/main/resources/application.yml
    client:
      timeout-millis: 250 # ms
    --- src/main/resources/application.properties
    client.timeout-millis=250
    ");
}

#[rstest]
fn parallel_runs_match_sequential_runs(classpath: Arc<Classpath>) {
    assert_eq!(migrate(&classpath, true), migrate(&classpath, false));
}

#[rstest]
fn recipes_that_match_nothing_share_every_input(classpath: Arc<Classpath>) {
    let recipe = RecipeRegistry::with_catalog()
        .create(
            "graft.java.ChangeMethodName",
            json!({ "methodPattern": "com.acme.Client close()", "newMethodName": "shutdown" }),
        )
        .unwrap_or_else(|err| panic!("recipe: {err}"));

    let outcome = run(&recipe, &classpath, true);

    assert_eq!(outcome.cycles(), 1);
    for result in outcome.results() {
        let before = result
            .before()
            .unwrap_or_else(|| panic!("no generated files"));
        assert!(Arc::ptr_eq(before, result.after()));
    }
}

/// Appends an underscore to `run` on every pass, so it never settles.
struct Restless;

impl TreeVisitor for Restless {
    fn visit(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        let node = walk_children(self, cursor, ctx);
        match node.text() {
            Some(text) if node.is("identifier") && text.starts_with("run") => {
                Arc::new(node.with_text(format!("{text}_")))
            }
            _ => node,
        }
    }
}

impl Recipe for Restless {
    fn name(&self) -> &str {
        "com.acme.Restless"
    }

    fn editor<'a>(&'a self, _acc: Option<&'a Accumulator>) -> Option<Box<dyn TreeVisitor + 'a>> {
        Some(Box::new(Self))
    }
}

#[rstest]
fn runs_that_keep_changing_report_non_convergence(classpath: Arc<Classpath>) {
    let mut registry = RecipeRegistry::with_catalog();
    registry
        .register("com.acme.Restless", |_, _| Ok(Arc::new(Restless)))
        .unwrap_or_else(|err| panic!("register: {err}"));
    let recipe = registry
        .create("com.acme.Restless", Value::Null)
        .unwrap_or_else(|err| panic!("recipe: {err}"));

    let outcome = run(&recipe, &classpath, false);

    assert!(!outcome.is_converged());
    assert_eq!(outcome.cycles(), 3);
    let codes: Vec<DiagnosticCode> = outcome.diagnostics().iter().map(|d| d.code()).collect();
    assert_eq!(codes, [DiagnosticCode::NonConvergence]);
    assert_snapshot!(
        outcome.diagnostics().first().map(|d| d.message().to_owned()).unwrap_or_default(),
        @"files were still changing after 3 cycles; changed in the last cycle by: com.acme.Restless"
    );
}

#[rstest]
fn unsupported_and_broken_sources_are_skipped(classpath: Arc<Classpath>) {
    let (files, skipped) = parse_sources(
        [
            (Utf8Path::new("README.md"), "# graft\n"),
            (Utf8Path::new("src/Broken.java"), "class Broken {\n"),
            (Utf8Path::new("src/Fine.java"), "class Fine {}\n"),
        ],
        &classpath,
    );

    assert_eq!(files.len(), 1);
    assert_eq!(skipped.len(), 2);
    assert!(matches!(skipped.first(), Some(SourceError::Unsupported { .. })));
    assert!(matches!(skipped.get(1), Some(SourceError::Java(_))));
    assert_snapshot!(
        skipped.first().map(ToString::to_string).unwrap_or_default(),
        @"no parser for README.md"
    );
}

#[test]
fn catalog_errors_name_the_recipe() {
    let registry = RecipeRegistry::with_catalog();
    let errors: Vec<String> = [
        ("graft.java.Unknown", Value::Null),
        ("graft.java.ChangeType", json!({ "oldFullyQualifiedTypeName": "a.B" })),
        (
            "graft.java.ChangeMethodName",
            json!({ "methodPattern": "a.B c()", "newMethodName": "not valid" }),
        ),
    ]
    .into_iter()
    .filter_map(|(name, options)| registry.create(name, options).err())
    .map(|err: CatalogError| err.to_string())
    .collect();

    assert_eq!(errors.len(), 3);
    assert_debug_snapshot!(errors.first(), @r#"
    Some(
        "unknown recipe: graft.java.Unknown",
    )
    "#);
}
