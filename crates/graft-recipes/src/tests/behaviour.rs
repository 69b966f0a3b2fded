//! Behaviour-driven tests for built-in recipes run through the registry.

use std::cell::RefCell;
use std::sync::Arc;

use graft_core::{FileResult, RecipeRun};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::RecipeRegistry;
use crate::maven::StaticMetadataSource;
use crate::testing::RewriteTest;

const SPRING_STUBS: [&str; 4] = [
    "package org.springframework.boot.test.context;\npublic @interface SpringBootTest {}\n",
    "package org.springframework.boot.resttestclient;\npublic class TestRestTemplate {}\n",
    "package org.springframework.boot.resttestclient.autoconfigure;\npublic @interface AutoConfigureTestRestTemplate {}\n",
    "package org.springframework.test.context;\npublic @interface ActiveProfiles {}\n",
];

#[derive(Default)]
struct TestWorld {
    metadata: Option<StaticMetadataSource>,
    harness: Option<RewriteTest>,
    stubs: Vec<String>,
    sources: Vec<(String, String)>,
    run: Option<RecipeRun>,
    second: Option<RecipeRun>,
}

impl TestWorld {
    fn registry(&self) -> RecipeRegistry {
        let registry = RecipeRegistry::with_catalog();
        match &self.metadata {
            Some(source) => registry.with_metadata(Arc::new(source.clone())),
            None => registry,
        }
    }

    fn harness(&self) -> RewriteTest {
        let harness = self.harness.clone().expect("a recipe was given");
        let stubs: Vec<&str> = self.stubs.iter().map(String::as_str).collect();
        harness.with_stubs(&stubs)
    }

    fn result(&self, path: &str) -> &FileResult {
        self.run
            .as_ref()
            .expect("the recipe ran")
            .results()
            .iter()
            .find(|result| result.after().path().as_str() == path)
            .unwrap_or_else(|| panic!("no result for {path}"))
    }
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

fn unquote(s: &str) -> String {
    s.trim_matches('"').replace("\\n", "\n")
}

#[given("the Java stub {text}")]
fn given_stub(world: &RefCell<TestWorld>, text: String) {
    world.borrow_mut().stubs.push(unquote(&text));
}

#[given("the Spring Boot test stubs")]
fn given_spring_stubs(world: &RefCell<TestWorld>) {
    world
        .borrow_mut()
        .stubs
        .extend(SPRING_STUBS.iter().map(|stub| (*stub).to_owned()));
}

#[given("published versions {versions} of {coordinates}")]
fn given_published_versions(world: &RefCell<TestWorld>, versions: String, coordinates: String) {
    let (group, artifact) = coordinates.split_once(':').expect("group:artifact");
    let listed: Vec<&str> = versions
        .split([',', ' '])
        .filter(|part| !part.is_empty() && *part != "and")
        .collect();
    let mut w = world.borrow_mut();
    let source = w.metadata.take().unwrap_or_default();
    w.metadata = Some(source.with_versions(group, artifact, &listed));
}

#[given("the recipe {name} configured with {options}")]
fn given_configured_recipe(world: &RefCell<TestWorld>, name: String, options: String) {
    let parsed: serde_json::Value = serde_json::from_str(&options).expect("options are JSON");
    let recipe = world
        .borrow()
        .registry()
        .create(&name, parsed)
        .expect("recipe builds");
    world.borrow_mut().harness = Some(RewriteTest::new(recipe));
}

#[given("the preset recipe {name}")]
fn given_preset_recipe(world: &RefCell<TestWorld>, name: String) {
    let recipe = world
        .borrow()
        .registry()
        .create(&name, serde_json::Value::Null)
        .expect("preset builds");
    world.borrow_mut().harness = Some(RewriteTest::new(recipe));
}

#[given("the source file {path} containing {text}")]
fn given_source(world: &RefCell<TestWorld>, path: String, text: String) {
    world.borrow_mut().sources.push((path, unquote(&text)));
}

#[when("the recipe runs")]
fn when_recipe_runs(world: &RefCell<TestWorld>) {
    let mut w = world.borrow_mut();
    let sources: Vec<(&str, &str)> = w
        .sources
        .iter()
        .map(|(path, text)| (path.as_str(), text.as_str()))
        .collect();
    let run = w.harness().run(&sources);
    drop(sources);
    w.run = Some(run);
}

#[when("the recipe runs again on its output")]
fn when_recipe_runs_again(world: &RefCell<TestWorld>) {
    let mut w = world.borrow_mut();
    let outputs: Vec<(String, String)> = w
        .run
        .as_ref()
        .expect("the recipe ran")
        .after_sources()
        .iter()
        .map(|file| (file.path().to_string(), file.print()))
        .collect();
    let sources: Vec<(&str, &str)> = outputs
        .iter()
        .map(|(path, text)| (path.as_str(), text.as_str()))
        .collect();
    let second = w.harness().run(&sources);
    w.second = Some(second);
}

#[then("{path} reads {text}")]
fn then_file_reads(world: &RefCell<TestWorld>, path: String, text: String) {
    let w = world.borrow();
    assert!(w.run.as_ref().is_some_and(RecipeRun::is_converged));
    assert_eq!(w.result(&path).after().print(), unquote(&text));
}

#[then("{path} imports {fqn} exactly once")]
fn then_imported_once(world: &RefCell<TestWorld>, path: String, fqn: String) {
    let printed = world.borrow().result(&path).after().print();
    let import = format!("import {fqn};");
    assert_eq!(printed.lines().filter(|line| *line == import).count(), 1);
}

#[then("{path} is returned as the same tree")]
fn then_same_tree(world: &RefCell<TestWorld>, path: String) {
    let w = world.borrow();
    let result = w.result(&path);
    let before = result.before().expect("an input file");
    assert!(Arc::ptr_eq(before, result.after()));
    assert!(!result.has_changes());
}

#[then("the second run changes nothing")]
fn then_second_run_idle(world: &RefCell<TestWorld>) {
    let w = world.borrow();
    let second = w.second.as_ref().expect("the recipe ran twice");
    assert_eq!(second.changed().count(), 0);
    assert_eq!(second.cycles(), 1);
}

#[scenario(
    path = "tests/features/recipes.feature",
    name = "A time unit argument and its import are added once"
)]
fn time_unit_added_once(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipes.feature",
    name = "Only the matched overload is rewritten"
)]
fn matched_overload_only(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipes.feature",
    name = "Sources that do not match come back as the same tree"
)]
fn non_matching_sources_shared(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipes.feature",
    name = "A Spring Boot test gains the REST template annotation in order"
)]
fn spring_annotation_added(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipes.feature",
    name = "A Spring Boot test that already has the annotation is unchanged"
)]
fn spring_annotation_present(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipes.feature",
    name = "A property upgrade holds with the parent pom listed first"
)]
fn property_upgrade_parent_first(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/recipes.feature",
    name = "A property upgrade holds with the child pom listed first"
)]
fn property_upgrade_child_first(world: RefCell<TestWorld>) {
    drop(world);
}
