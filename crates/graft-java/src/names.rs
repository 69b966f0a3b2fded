//! Resolution of type names against imports and the classpath.

use std::collections::HashMap;

use graft_core::{Node, TypeHandle};

use crate::classpath::ClassLookup;
use crate::syntax::{self, ImportDecl};

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// Returns whether `name` is a primitive type keyword (or `void`).
#[must_use]
pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

/// The names visible in one compilation unit.
///
/// Lookup order for a simple name: types declared in the unit, single-type
/// imports, the unit's own package, `java.lang`, then on-demand imports.
/// A single-type import binds even when the classpath does not know the
/// type.
#[derive(Debug, Clone, Default)]
pub struct ImportScope {
    package: String,
    declared: HashMap<String, String>,
    explicit: HashMap<String, String>,
    wildcards: Vec<String>,
    static_members: HashMap<String, String>,
    static_wildcards: Vec<String>,
}

impl ImportScope {
    /// Builds the scope of a compilation unit.
    #[must_use]
    pub fn of_compilation_unit(root: &Node) -> Self {
        let package = syntax::package_name(root).unwrap_or_default();
        let mut scope = Self {
            package,
            ..Self::default()
        };
        for decl in syntax::imports(root) {
            scope.add_import(&decl);
        }
        for declaration in syntax::type_declarations(root) {
            let prefix = scope.package.clone();
            scope.declare(declaration, &prefix);
        }
        scope
    }

    fn add_import(&mut self, decl: &ImportDecl) {
        match (decl.is_static, decl.is_wildcard) {
            (false, false) => {
                let simple = graft_core::simple_name(&decl.name).to_owned();
                self.explicit.entry(simple).or_insert_with(|| decl.name.clone());
            }
            (false, true) => self.wildcards.push(decl.name.clone()),
            (true, false) => {
                if let Some((owner, member)) = decl.name.rsplit_once('.') {
                    self.static_members
                        .entry(member.to_owned())
                        .or_insert_with(|| owner.to_owned());
                }
            }
            (true, true) => self.static_wildcards.push(decl.name.clone()),
        }
    }

    fn declare(&mut self, declaration: &Node, outer: &str) {
        let Some(name) = syntax::declared_name(declaration) else {
            return;
        };
        let fqn = qualify(outer, &name);
        for member in syntax::member_types(declaration) {
            self.declare(member, &fqn);
        }
        self.declared.entry(name).or_insert(fqn);
    }

    /// Returns the package of the unit; empty for the default package.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Returns the owner types a static member may have been imported from.
    #[must_use]
    pub fn static_owners(&self, member: &str) -> Vec<String> {
        self.static_members
            .get(member)
            .into_iter()
            .cloned()
            .chain(self.static_wildcards.iter().cloned())
            .collect()
    }

    /// Resolves a type name as written in source.
    ///
    /// Handles primitives, arrays (`int[]`), simple names and qualified or
    /// nested names. Returns `None` when nothing binds the name.
    #[must_use]
    pub fn resolve(&self, name: &str, types: &dyn ClassLookup) -> Option<TypeHandle> {
        if let Some(element) = name.strip_suffix("[]") {
            return self
                .resolve(element, types)
                .map(|handle| TypeHandle::array_of(&handle));
        }
        if is_primitive(name) {
            return Some(TypeHandle::primitive(name));
        }
        match name.split_once('.') {
            None => self.resolve_simple(name, types),
            Some((head, rest)) => self.resolve_qualified(name, head, rest, types),
        }
    }

    fn resolve_simple(&self, name: &str, types: &dyn ClassLookup) -> Option<TypeHandle> {
        if let Some(fqn) = self.declared.get(name).or_else(|| self.explicit.get(name)) {
            return Some(handle_for(fqn, types));
        }
        let same_package = qualify(&self.package, name);
        if let Some(handle) = types.handle(&same_package) {
            return Some(handle);
        }
        if let Some(handle) = types.handle(&format!("java.lang.{name}")) {
            return Some(handle);
        }
        self.wildcards
            .iter()
            .find_map(|package| types.handle(&format!("{package}.{name}")))
    }

    fn resolve_qualified(
        &self,
        name: &str,
        head: &str,
        rest: &str,
        types: &dyn ClassLookup,
    ) -> Option<TypeHandle> {
        if let Some(handle) = types.handle(name) {
            return Some(handle);
        }
        // `Outer.Inner` where `Outer` is itself visible by simple name.
        if let Some(outer) = self.resolve_simple(head, types) {
            let nested = format!("{}.{rest}", outer.fqn());
            return Some(handle_for(&nested, types));
        }
        // A fully-qualified name the classpath does not know still binds.
        head.starts_with(|c: char| c.is_ascii_lowercase())
            .then(|| TypeHandle::class(name))
    }
}

fn handle_for(fqn: &str, types: &dyn ClassLookup) -> TypeHandle {
    types
        .handle(fqn)
        .unwrap_or_else(|| TypeHandle::class(fqn))
}

/// Joins a package or outer type and a simple name.
#[must_use]
pub fn qualify(outer: &str, name: &str) -> String {
    if outer.is_empty() {
        name.to_owned()
    } else {
        format!("{outer}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classpath::{ClassInfo, Classpath};
    use crate::parser::parse_java;
    use graft_core::TypeKind;
    use rstest::rstest;

    fn scope(source: &str) -> ImportScope {
        let file = parse_java("A.java", source).expect("parse");
        ImportScope::of_compilation_unit(file.root())
    }

    #[rstest]
    #[case::explicit_unknown("Widget", Some("org.acme.Widget"))]
    #[case::java_lang("String", Some("java.lang.String"))]
    #[case::wildcard("TimeUnit", Some("java.util.concurrent.TimeUnit"))]
    #[case::same_package("Helper", Some("com.example.Helper"))]
    #[case::declared_nested("Inner", Some("com.example.A.Inner"))]
    #[case::nested_through_outer("A.Inner", Some("com.example.A.Inner"))]
    #[case::qualified_unknown("org.other.Thing", Some("org.other.Thing"))]
    #[case::unknown("Mystery", None)]
    fn resolves_names(#[case] name: &str, #[case] expected: Option<&str>) {
        let scope = scope(
            "package com.example;\nimport org.acme.Widget;\nimport java.util.concurrent.*;\nclass A { class Inner {} }\n",
        );
        let classpath = Classpath::jdk().with(ClassInfo::class("com.example.Helper"));
        let resolved = scope.resolve(name, &classpath);
        assert_eq!(resolved.as_ref().map(TypeHandle::fqn), expected);
    }

    #[test]
    fn resolves_arrays_and_primitives() {
        let scope = scope("class A {}");
        let classpath = Classpath::jdk();
        let array = scope.resolve("long[]", &classpath).expect("array");
        assert_eq!(array.fqn(), "long[]");
        assert_eq!(array.kind(), TypeKind::Array);
        let unit = scope
            .resolve("java.util.concurrent.TimeUnit", &classpath)
            .expect("enum");
        assert_eq!(unit.kind(), TypeKind::Enum);
    }
}
