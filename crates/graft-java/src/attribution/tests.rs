use std::sync::Arc;

use graft_core::{Node, TypeKind};
use rstest::{fixture, rstest};

use super::*;
use crate::parser::JavaParser;

const STUB: &str = "package org.acme;\nimport java.util.concurrent.TimeUnit;\npublic class A {\n    public void method(int x) {}\n    public void method(long x) {}\n    public void method(long x, TimeUnit unit) {}\n    public static A create() { return null; }\n}\n";

const SOURCE: &str = "package demo;\n\nimport org.acme.A;\nimport java.util.concurrent.TimeUnit;\n\nclass Test {\n    A a;\n\n    void run(String name) {\n        a.method(100);\n        a.method(100L);\n        long delay = 5;\n        a.method(delay, TimeUnit.SECONDS);\n        A.create().method(1);\n        unknown.method(1);\n        String s = name + 1;\n    }\n}\n";

#[fixture]
fn classpath() -> Arc<Classpath> {
    Arc::new(Classpath::from_sources(&[STUB]).expect("stub"))
}

fn attributed(classpath: &Arc<Classpath>, text: &str) -> Arc<Node> {
    let mut parser = JavaParser::new()
        .expect("parser")
        .with_classpath(Arc::clone(classpath));
    Arc::clone(parser.parse("demo/Test.java", text).expect("parse").root())
}

fn invocations(root: &Node) -> Vec<String> {
    root.descendants()
        .filter(|node| node.is("method_invocation"))
        .map(|node| {
            node.method_type()
                .map_or_else(|| "<unresolved>".to_owned(), ToString::to_string)
        })
        .collect()
}

#[rstest]
fn resolves_overloads_by_argument_type(classpath: Arc<Classpath>) {
    let root = attributed(&classpath, SOURCE);
    insta::assert_debug_snapshot!(invocations(&root), @r#"
    [
        "org.acme.A method(int)",
        "org.acme.A method(long)",
        "org.acme.A method(long,java.util.concurrent.TimeUnit)",
        "org.acme.A method(int)",
        "org.acme.A create()",
        "<unresolved>",
    ]
    "#);
}

#[rstest]
fn types_enum_constants_and_locals(classpath: Arc<Classpath>) {
    let root = attributed(&classpath, SOURCE);
    let seconds = root
        .descendants()
        .find(|node| node.is("field_access") && node.print_trimmed() == "TimeUnit.SECONDS")
        .expect("field access");
    let handle = seconds.type_handle().expect("typed");
    assert_eq!(handle.fqn(), "java.util.concurrent.TimeUnit");
    assert_eq!(handle.kind(), TypeKind::Enum);

    let concat = root
        .descendants()
        .find(|node| node.is("binary_expression"))
        .expect("binary");
    assert_eq!(concat.type_handle().map(TypeHandle::fqn), Some("java.lang.String"));
}

#[rstest]
fn attributes_imports_and_declarations(classpath: Arc<Classpath>) {
    let root = attributed(&classpath, SOURCE);
    let import = root
        .descendants()
        .find(|node| node.is("import_declaration"))
        .expect("import");
    assert_eq!(import.type_handle().map(TypeHandle::fqn), Some("org.acme.A"));

    let class = root
        .descendants()
        .find(|node| node.is("class_declaration"))
        .expect("class");
    assert_eq!(class.type_handle().map(TypeHandle::fqn), Some("demo.Test"));

    let method = root
        .descendants()
        .find(|node| node.is("method_declaration"))
        .and_then(|node| node.method_type().cloned())
        .expect("declared method");
    assert_eq!(method.to_string(), "demo.Test run(java.lang.String)");
}

#[rstest]
fn reattributing_shares_the_tree(classpath: Arc<Classpath>) {
    let root = attributed(&classpath, SOURCE);
    let again = attribute_root(&root, &classpath);
    assert!(Arc::ptr_eq(&root, &again));
}

#[rstest]
fn lambda_parameters_shadow_fields(classpath: Arc<Classpath>) {
    let source = "import org.acme.A;\nclass T {\n    A a;\n    void f(java.util.List<A> list) { list.forEach(a -> a.method(1)); }\n}\n";
    let root = attributed(&classpath, source);
    let inner = root
        .descendants()
        .find(|node| node.is("method_invocation") && node.print_trimmed() == "a.method(1)")
        .expect("inner call");
    assert!(inner.method_type().is_none());
}

#[rstest]
fn overridden_methods_record_their_origin(classpath: Arc<Classpath>) {
    let source = "class Task implements Runnable {\n    @Override\n    public void run() {}\n    void go() { run(); }\n}\n";
    let root = attributed(&classpath, source);
    let call = root
        .descendants()
        .find(|node| node.is("method_invocation"))
        .and_then(|node| node.method_type().cloned())
        .expect("resolved call");
    assert_eq!(call.declaring().fqn(), "Task");
    let overrides: Vec<&str> = call.overrides().iter().map(TypeHandle::fqn).collect();
    assert_eq!(overrides, vec!["java.lang.Runnable"]);
}
