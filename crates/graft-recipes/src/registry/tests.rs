//! Unit tests for the recipe registry.

use std::sync::Arc;

use graft_core::RecipeError;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::maven::StaticMetadataSource;
use crate::testing::{RewriteTest, after};

#[fixture]
fn registry() -> RecipeRegistry {
    RecipeRegistry::with_catalog()
}

const COMPOSITE: &str = "\
type: specs.openrewrite.org/v1beta/recipe
name: com.acme.Modernise
displayName: Modernise clients
description: Applies every client migration.
recipeList:
  - com.acme.RenameSend
  - graft.java.AddTimeUnitArgument:
      methodPattern: com.acme.Client dispatch(int)
      timeUnit: SECONDS
---
# renames come first
type: specs.openrewrite.org/v1beta/recipe
name: com.acme.RenameSend
recipeList:
  - graft.java.ChangeMethodName:
      methodPattern: com.acme.Client send(int)
      newMethodName: dispatch
";

#[rstest]
fn catalog_lists_every_built_in(registry: RecipeRegistry) {
    insta::assert_debug_snapshot!(registry.names(), @r#"
    [
        "graft.java.AddClassAnnotation",
        "graft.java.AddTimeUnitArgument",
        "graft.java.ChangeMethodName",
        "graft.java.ChangeType",
        "graft.java.search.FindMethods",
        "graft.java.spring.AddAutoConfigureTestRestTemplate",
        "graft.maven.UpgradeDependencyVersion",
        "graft.properties.ChangePropertyKey",
        "graft.properties.ChangePropertyValue",
        "graft.xml.ChangeTagValue",
    ]
    "#);
    assert_eq!(registry.len(), 10);
    assert!(!registry.is_empty());
    assert!(RecipeRegistry::new().is_empty());
}

#[rstest]
fn creates_a_configured_recipe(registry: RecipeRegistry) {
    let recipe = registry
        .create(
            "graft.xml.ChangeTagValue",
            json!({ "elementName": "/project/version", "newValue": "2.0" }),
        )
        .expect("recipe");
    assert_eq!(recipe.name(), "graft.xml.ChangeTagValue");
}

#[rstest]
fn presets_take_no_options(registry: RecipeRegistry) {
    let recipe = registry
        .create("graft.java.spring.AddAutoConfigureTestRestTemplate", Value::Null)
        .expect("preset");
    assert_eq!(
        recipe.name(),
        "graft.java.spring.AddAutoConfigureTestRestTemplate"
    );
    let err = registry
        .create(
            "graft.java.spring.AddAutoConfigureTestRestTemplate",
            json!({ "annotationType": "x.Y" }),
        )
        .err()
        .expect("options rejected");
    assert!(matches!(err, CatalogError::Options { .. }));
}

#[rstest]
fn unknown_names_are_reported(registry: RecipeRegistry) {
    let err = registry
        .create("com.acme.Nothing", Value::Null)
        .err()
        .expect("unknown");
    assert_eq!(
        err,
        CatalogError::Recipe(RecipeError::unknown_recipe("com.acme.Nothing"))
    );
}

#[rstest]
#[case::missing_field(json!({ "timeUnit": "SECONDS" }))]
#[case::unknown_field(json!({ "methodPattern": "A m(int)", "unit": "SECONDS" }))]
#[case::unknown_unit(json!({ "methodPattern": "A m(int)", "timeUnit": "FORTNIGHTS" }))]
fn malformed_options_are_rejected(registry: RecipeRegistry, #[case] options: Value) {
    let err = registry
        .create("graft.java.AddTimeUnitArgument", options)
        .err()
        .expect("invalid options");
    assert!(matches!(err, CatalogError::Options { ref recipe, .. } if recipe == "graft.java.AddTimeUnitArgument"));
}

#[rstest]
fn recipe_validation_errors_pass_through(registry: RecipeRegistry) {
    let err = registry
        .create(
            "graft.maven.UpgradeDependencyVersion",
            json!({ "groupId": "", "artifactId": "a", "newVersion": "1" }),
        )
        .err()
        .expect("missing group");
    assert!(matches!(
        err,
        CatalogError::Recipe(RecipeError::MissingOption { .. })
    ));
}

#[rstest]
fn duplicate_registrations_are_rejected(mut registry: RecipeRegistry) {
    let err = registry
        .register("graft.java.ChangeType", |_, _| {
            Err(CatalogError::options("graft.java.ChangeType", "unused"))
        })
        .err()
        .expect("duplicate");
    assert_eq!(
        err,
        CatalogError::Duplicate {
            name: "graft.java.ChangeType".to_owned()
        }
    );
}

#[rstest]
fn composites_resolve_forward_references(mut registry: RecipeRegistry) {
    let names = registry.load_declarative(COMPOSITE).expect("documents load");
    assert_eq!(names, ["com.acme.Modernise", "com.acme.RenameSend"]);
    assert_eq!(registry.len(), 12);

    let recipe = registry
        .create("com.acme.Modernise", Value::Null)
        .expect("composite");
    assert_eq!(recipe.display_name(), "Modernise clients");
    let children: Vec<String> = recipe
        .recipe_list()
        .iter()
        .map(|child| child.name().to_owned())
        .collect();
    assert_eq!(children, ["com.acme.RenameSend", "graft.java.AddTimeUnitArgument"]);
}

#[rstest]
fn composites_apply_their_recipes_in_order(mut registry: RecipeRegistry) {
    registry.load_declarative(COMPOSITE).expect("documents load");
    let recipe = registry
        .create("com.acme.Modernise", Value::Null)
        .expect("composite");
    let client = "package com.acme;\npublic class Client {\n    public void send(int timeout) {}\n    public void dispatch(int timeout) {}\n    public void dispatch(long timeout, java.util.concurrent.TimeUnit unit) {}\n}\n";
    RewriteTest::new(recipe).with_stubs(&[client]).rewrite_run(&[after(
        "src/Job.java",
        "import com.acme.Client;\n\nclass Job {\n    void run(Client client) {\n        client.send(5);\n    }\n}\n",
        "import com.acme.Client;\n\nimport java.util.concurrent.TimeUnit;\n\nclass Job {\n    void run(Client client) {\n        client.dispatch(5, TimeUnit.SECONDS);\n    }\n}\n",
    )]);
}

#[rstest]
fn cycles_between_documents_are_rejected(mut registry: RecipeRegistry) {
    let yaml = "\
type: specs.openrewrite.org/v1beta/recipe
name: com.acme.A
recipeList:
  - com.acme.B
---
type: specs.openrewrite.org/v1beta/recipe
name: com.acme.B
recipeList:
  - com.acme.A
";
    let err = registry.load_declarative(yaml).err().expect("cycle");
    assert!(matches!(err, CatalogError::Document { .. }));
    assert!(!registry.contains("com.acme.A"));
}

#[rstest]
#[case::wrong_type("type: specs.openrewrite.org/v1beta/style\nname: com.acme.S\n")]
#[case::unknown_key("type: specs.openrewrite.org/v1beta/recipe\nname: com.acme.S\ntags: [x]\n")]
#[case::two_keys(
    "type: specs.openrewrite.org/v1beta/recipe\nname: com.acme.S\nrecipeList:\n  - { a.B: {}, c.D: {} }\n"
)]
fn malformed_documents_are_rejected(mut registry: RecipeRegistry, #[case] yaml: &str) {
    let err = registry.load_declarative(yaml).err().expect("malformed");
    assert!(matches!(err, CatalogError::Document { .. }));
}

#[rstest]
fn failing_entries_register_nothing(mut registry: RecipeRegistry) {
    let yaml = "\
type: specs.openrewrite.org/v1beta/recipe
name: com.acme.Good
recipeList:
  - graft.java.search.FindMethods:
      methodPattern: java.util.List size()
---
type: specs.openrewrite.org/v1beta/recipe
name: com.acme.Bad
recipeList:
  - com.acme.Missing
";
    let err = registry.load_declarative(yaml).err().expect("unknown entry");
    assert_eq!(
        err,
        CatalogError::Recipe(RecipeError::unknown_recipe("com.acme.Missing"))
    );
    assert!(!registry.contains("com.acme.Good"));
    assert_eq!(registry.len(), 10);
}

#[rstest]
fn declared_names_must_be_new(mut registry: RecipeRegistry) {
    let yaml = "type: specs.openrewrite.org/v1beta/recipe\nname: graft.java.ChangeType\n";
    let err = registry.load_declarative(yaml).err().expect("duplicate");
    assert!(matches!(err, CatalogError::Duplicate { .. }));
}

#[test]
fn dependency_recipes_use_the_registry_metadata() {
    let source = StaticMetadataSource::new().with_versions("org.acme", "core", &["1.0", "1.2"]);
    let registry = RecipeRegistry::with_catalog().with_metadata(Arc::new(source));
    let recipe = registry
        .create(
            "graft.maven.UpgradeDependencyVersion",
            json!({ "groupId": "org.acme", "artifactId": "core", "newVersion": "latest.release" }),
        )
        .expect("recipe");
    let pom = "<project>\n  <dependencies>\n    <dependency>\n      <groupId>org.acme</groupId>\n      <artifactId>core</artifactId>\n      <version>1.0</version>\n    </dependency>\n  </dependencies>\n</project>\n";
    RewriteTest::new(recipe).rewrite_run(&[after("pom.xml", pom, &pom.replace("1.0<", "1.2<"))]);
}

#[derive(Default)]
struct Unreachable {
    calls: std::sync::atomic::AtomicUsize,
}

impl crate::maven::MetadataSource for Unreachable {
    fn versions(&self, group: &str, artifact: &str) -> Result<Vec<String>, crate::MetadataError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Err(crate::MetadataError::unavailable(format!("{group}:{artifact}"), "offline"))
    }
}

#[test]
fn unset_retries_follow_the_run_config() {
    let source = Arc::new(Unreachable::default());
    let registry = RecipeRegistry::with_catalog()
        .with_metadata(Arc::clone(&source) as Arc<dyn crate::maven::MetadataSource>)
        .with_run_config(&graft_core::RunConfig::new(3, false, 2));
    let recipe = registry
        .create(
            "graft.maven.UpgradeDependencyVersion",
            json!({ "groupId": "org.acme", "artifactId": "core", "newVersion": "latest.release" }),
        )
        .expect("recipe");
    let pom = "<project>\n  <dependencies>\n    <dependency>\n      <groupId>org.acme</groupId>\n      <artifactId>core</artifactId>\n      <version>1.0</version>\n    </dependency>\n  </dependencies>\n</project>\n";
    let run = RewriteTest::new(recipe).run(&[("pom.xml", pom)]);
    assert_eq!(run.changed().count(), 1);
    assert_eq!(source.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
}
