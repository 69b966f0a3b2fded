//! Behaviour-driven tests for templates and import maintenance.

use std::cell::RefCell;
use std::sync::Arc;

use graft_core::{Cursor, ExecutionContext, Node, visit_file};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::{
    Classpath, Coordinates, Java, JavaParser, JavaTemplate, JavaVisitor, MethodMatcher,
    SnippetContext, TemplateArg, syntax, visit_children,
};

#[derive(Default)]
struct TestWorld {
    stubs: Vec<String>,
    source: String,
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

struct AppendUnit {
    matcher: MethodMatcher,
    template: JavaTemplate,
    unit: String,
}

impl JavaVisitor for AppendUnit {
    fn visit_method_invocation(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        let visited = visit_children(self, cursor, ctx);
        let argument = visited
            .child_by_field("arguments")
            .and_then(|list| list.named_children().next())
            .cloned();
        match argument {
            Some(argument) if self.matcher.matches_node(cursor.value()) => {
                let args = [TemplateArg::from(argument), TemplateArg::from(self.unit.as_str())];
                self.template
                    .apply(
                        &cursor.with_value(Arc::clone(&visited)),
                        Coordinates::ReplaceArguments,
                        &args,
                        ctx,
                    )
                    .expect("template applies")
            }
            _ => visited,
        }
    }
}

#[given("the stub class {source}")]
fn given_stub(world: &RefCell<TestWorld>, source: String) {
    world.borrow_mut().stubs.push(strip_quotes(&source).to_owned());
}

#[given("the source {source}")]
fn given_source(world: &RefCell<TestWorld>, source: String) {
    world.borrow_mut().source = format!("{}\n", strip_quotes(&source));
}

#[when("calls matching {pattern} get the time unit {unit}")]
fn when_append_unit(world: &RefCell<TestWorld>, pattern: String, unit: String) {
    let mut w = world.borrow_mut();
    let stubs: Vec<&str> = w.stubs.iter().map(String::as_str).collect();
    let classpath = Arc::new(Classpath::from_sources(&stubs).expect("stubs parse"));
    let mut parser = JavaParser::new()
        .expect("parser")
        .with_classpath(classpath);
    let file = Arc::new(parser.parse("Test.java", &w.source).expect("source parses"));

    let visitor = AppendUnit {
        matcher: MethodMatcher::new(strip_quotes(&pattern)).expect("pattern"),
        template: JavaTemplate::builder("#{any(long)}, TimeUnit.#{}")
            .context(SnippetContext::Arguments)
            .imports(["java.util.concurrent.TimeUnit"])
            .build()
            .expect("template"),
        unit: strip_quotes(&unit).to_owned(),
    };
    let mut ctx = ExecutionContext::for_file(&file, 1);
    let visited = visit_file(&mut Java(visitor), &file, &mut ctx);
    w.source = ctx.drain_after_visits(&visited).print();
}

#[then("the source contains {text}")]
fn then_contains(world: &RefCell<TestWorld>, text: String) {
    let w = world.borrow();
    assert!(
        w.source.contains(strip_quotes(&text)),
        "{} not found in:\n{}",
        strip_quotes(&text),
        w.source
    );
}

#[then("the source imports {fqn} exactly once")]
fn then_imported_once(world: &RefCell<TestWorld>, fqn: String) {
    assert_eq!(import_count(&world.borrow(), strip_quotes(&fqn)), 1);
}

#[then("the source imports {fqn} exactly {count} times")]
fn then_imported_times(world: &RefCell<TestWorld>, fqn: String, count: usize) {
    assert_eq!(import_count(&world.borrow(), strip_quotes(&fqn)), count);
}

fn import_count(world: &TestWorld, fqn: &str) -> usize {
    let file = crate::parse_java("Test.java", &world.source).expect("output parses");
    syntax::imports(file.root())
        .iter()
        .filter(|import| import.name == fqn)
        .count()
}

#[scenario(
    path = "tests/features/java_rewrites.feature",
    name = "A time unit argument is appended with its import"
)]
fn time_unit_added(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/java_rewrites.feature",
    name = "Rewriting the output again changes nothing"
)]
fn rewrite_is_idempotent(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/java_rewrites.feature",
    name = "Calls to other overloads are left alone"
)]
fn other_overloads_untouched(world: RefCell<TestWorld>) {
    drop(world);
}
