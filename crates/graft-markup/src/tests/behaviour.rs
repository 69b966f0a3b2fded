//! Behaviour-driven tests for XML, YAML and properties edits.

use std::cell::RefCell;
use std::sync::Arc;

use graft_core::{Cursor, ExecutionContext, Node, SourceFile, TreeMatcher, TreeVisitor, visit_file};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::PropertyKeyMatcher;
use crate::properties::{self, PropertiesVisitor};
use crate::xml::{self, XPathMatcher, XmlVisitor};
use crate::yaml::{self, YamlVisitor};

#[derive(Default)]
struct TestWorld {
    file: Option<Arc<SourceFile>>,
    printed: String,
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

fn unquote(s: &str) -> String {
    s.trim_matches('"').replace("\\n", "\n")
}

struct SetTag {
    matcher: XPathMatcher,
    value: String,
}

impl XmlVisitor for SetTag {
    fn visit_tag(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        if self.matcher.matches(cursor) {
            return Arc::new(xml::with_text(cursor.value(), &self.value));
        }
        xml::visit_children(self, cursor, ctx)
    }
}

struct SetValue {
    matcher: PropertyKeyMatcher,
    value: String,
}

impl YamlVisitor for SetValue {
    fn visit_entry(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        if self.matcher.matches(cursor) {
            return Arc::new(yaml::with_entry_value(cursor.value(), &self.value));
        }
        yaml::visit_children(self, cursor, ctx)
    }
}

impl PropertiesVisitor for SetValue {
    fn visit_entry(&mut self, cursor: &Cursor<'_>, _ctx: &mut ExecutionContext) -> Arc<Node> {
        if self.matcher.matches(cursor) {
            return Arc::new(properties::with_value(cursor.value(), &self.value));
        }
        Arc::clone(cursor.value())
    }
}

fn run(world: &mut TestWorld, mut visitor: Box<dyn TreeVisitor + '_>) {
    let file = world.file.take().expect("a file was given");
    let mut ctx = ExecutionContext::for_file(&file, 1);
    let after = visit_file(visitor.as_mut(), &file, &mut ctx);
    world.printed = after.print();
    world.file = Some(after);
}

#[given("the pom.xml {text}")]
fn given_pom(world: &RefCell<TestWorld>, text: String) {
    let file = xml::parse_xml("pom.xml", &unquote(&text)).expect("pom parses");
    world.borrow_mut().file = Some(Arc::new(file));
}

#[given("the application.yml {text}")]
fn given_yaml(world: &RefCell<TestWorld>, text: String) {
    let file = yaml::parse_yaml("application.yml", &unquote(&text)).expect("yaml parses");
    world.borrow_mut().file = Some(Arc::new(file));
}

#[given("the application.properties {text}")]
fn given_properties(world: &RefCell<TestWorld>, text: String) {
    let file = properties::parse_properties("application.properties", &unquote(&text))
        .expect("properties parse");
    world.borrow_mut().file = Some(Arc::new(file));
}

#[when("the tags at {path} are set to {value}")]
fn when_tags_set(world: &RefCell<TestWorld>, path: String, value: String) {
    let visitor = SetTag {
        matcher: XPathMatcher::new(&unquote(&path)).expect("xpath"),
        value: unquote(&value),
    };
    run(&mut world.borrow_mut(), xml::xml(visitor));
}

#[when("the values at key {key} are set to {value}")]
fn when_values_set(world: &RefCell<TestWorld>, key: String, value: String) {
    let visitor = SetValue {
        matcher: PropertyKeyMatcher::new(&unquote(&key)).expect("key pattern"),
        value: unquote(&value),
    };
    let mut w = world.borrow_mut();
    let is_yaml = w
        .file
        .as_ref()
        .is_some_and(|file| file.language() == graft_core::Language::Yaml);
    if is_yaml {
        run(&mut w, yaml::yaml(visitor));
    } else {
        run(&mut w, properties::properties(visitor));
    }
}

#[then("the file reads {text}")]
fn then_file_reads(world: &RefCell<TestWorld>, text: String) {
    assert_eq!(world.borrow().printed, unquote(&text));
}

#[scenario(
    path = "tests/features/markup_edits.feature",
    name = "An XPath selects the tag whose text changes"
)]
fn xpath_tag_edit(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/markup_edits.feature",
    name = "A relaxed YAML key keeps its comment and quoting"
)]
fn yaml_relaxed_key_edit(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/markup_edits.feature",
    name = "A properties value changes beside its comment"
)]
fn properties_value_edit(world: RefCell<TestWorld>) {
    drop(world);
}
