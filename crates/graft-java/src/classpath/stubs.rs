//! Extraction of class summaries from Java source.

use graft_core::{Node, TypeKind};
use tracing::debug;

use super::{ClassInfo, ClassLookup, Classpath, MethodInfo};
use crate::error::JavaError;
use crate::names::{ImportScope, qualify};
use crate::parser::JavaParser;
use crate::syntax;

impl Classpath {
    /// Extends the JDK baseline with every type declared in `sources`.
    ///
    /// Sources are read in two passes so that stubs may refer to each other
    /// in any order.
    ///
    /// # Errors
    ///
    /// Returns [`JavaError`] when a stub does not parse.
    pub fn from_sources(sources: &[&str]) -> Result<Self, JavaError> {
        Self::jdk().with_sources(sources)
    }

    /// Adds every type declared in `sources` to this classpath.
    ///
    /// # Errors
    ///
    /// Returns [`JavaError`] when a stub does not parse.
    pub fn with_sources(mut self, sources: &[&str]) -> Result<Self, JavaError> {
        let mut parser = JavaParser::new()?;
        let mut units = Vec::with_capacity(sources.len());
        for (index, text) in sources.iter().enumerate() {
            let file = parser.parse(format!("stub-{index}.java"), text)?;
            units.push(file);
        }

        // First pass makes every declared name known, with its kind.
        for unit in &units {
            let package = syntax::package_name(unit.root()).unwrap_or_default();
            for declaration in syntax::type_declarations(unit.root()) {
                for (fqn, kind) in shells(declaration, &package) {
                    if !self.contains(&fqn) {
                        self.insert(ClassInfo::of_kind(&fqn, kind));
                    }
                }
            }
        }

        for unit in &units {
            let scope = ImportScope::of_compilation_unit(unit.root());
            let classes = declared_classes(unit.root(), &scope, &self);
            for info in classes {
                debug!(fqn = info.fqn(), methods = info.methods().len(), "loaded stub type");
                self.insert(info);
            }
        }
        Ok(self)
    }
}

fn shells(declaration: &Node, outer: &str) -> Vec<(String, TypeKind)> {
    let Some(name) = syntax::declared_name(declaration) else {
        return Vec::new();
    };
    let fqn = qualify(outer, &name);
    let mut out = vec![(fqn.clone(), kind_of(declaration))];
    for member in syntax::member_types(declaration) {
        out.extend(shells(member, &fqn));
    }
    out
}

fn kind_of(declaration: &Node) -> TypeKind {
    match declaration.kind() {
        "interface_declaration" => TypeKind::Interface,
        "enum_declaration" => TypeKind::Enum,
        "annotation_type_declaration" => TypeKind::Annotation,
        _ => TypeKind::Class,
    }
}

/// Summarises every type declared in a compilation unit, nested types
/// included.
pub(crate) fn declared_classes(
    root: &Node,
    scope: &ImportScope,
    types: &dyn ClassLookup,
) -> Vec<ClassInfo> {
    let mut out = Vec::new();
    for declaration in syntax::type_declarations(root) {
        summarise(declaration, scope.package(), scope, types, &mut out);
    }
    out
}

fn summarise(
    declaration: &Node,
    outer: &str,
    scope: &ImportScope,
    types: &dyn ClassLookup,
    out: &mut Vec<ClassInfo>,
) {
    let Some(simple) = syntax::declared_name(declaration) else {
        return;
    };
    let fqn = qualify(outer, &simple);
    let resolve = |written: &str| {
        scope
            .resolve(written, types)
            .map_or_else(|| written.to_owned(), |handle| handle.fqn().to_owned())
    };

    let mut info = ClassInfo::of_kind(&fqn, kind_of(declaration));
    for written in supertype_names(declaration) {
        info = info.extends(&resolve(&written));
    }
    if declaration.is("enum_declaration") {
        info = info.extends("java.lang.Enum");
    }
    for annotation in syntax::annotations(declaration) {
        if let Some(written) = syntax::annotation_name(annotation) {
            info = info.annotated(&resolve(&written));
        }
    }
    if let Some(body) = declaration.child_by_field("body") {
        for constant in body.children().iter().filter(|c| c.is("enum_constant")) {
            if let Some(name) = syntax::declared_name(constant) {
                info = info.constant(&name);
            }
        }
    }

    let is_interface = declaration.is("interface_declaration");
    for member in syntax::body_members(declaration) {
        match member.kind() {
            "method_declaration" | "annotation_type_element_declaration" => {
                let Some(method_name) = syntax::declared_name(member) else {
                    continue;
                };
                let (params, varargs) = syntax::parameters(member);
                let returns = member
                    .child_by_field("type")
                    .map_or_else(|| "void".to_owned(), |ty| resolve(&syntax::type_text(ty)));
                let method = MethodInfo::from_parts(
                    method_name,
                    params.iter().map(|(ty, _)| resolve(ty)).collect(),
                    Some(returns),
                    syntax::has_modifier(member, "static"),
                    varargs,
                );
                info = info.with_method(method);
            }
            "constructor_declaration" => {
                let (params, varargs) = syntax::parameters(member);
                let ctor = MethodInfo::from_parts(
                    graft_core::MethodType::CONSTRUCTOR.to_owned(),
                    params.iter().map(|(ty, _)| resolve(ty)).collect(),
                    None,
                    false,
                    varargs,
                );
                info = info.with_method(ctor);
            }
            "field_declaration" | "constant_declaration" => {
                let Some(ty) = member.child_by_field("type") else {
                    continue;
                };
                let type_name = resolve(&syntax::type_text(ty));
                let is_static = is_interface || syntax::has_modifier(member, "static");
                for field in syntax::declarator_names(member) {
                    info = if is_static {
                        info.static_field(&field, &type_name)
                    } else {
                        info.field(&field, &type_name)
                    };
                }
            }
            _ => {}
        }
    }
    out.push(info);

    for nested in syntax::member_types(declaration) {
        summarise(nested, &fqn, scope, types, out);
    }
}

fn supertype_names(declaration: &Node) -> Vec<String> {
    let mut names = Vec::new();
    for child in declaration.children() {
        match child.kind() {
            "superclass" => names.extend(
                child
                    .named_children()
                    .map(|ty| syntax::type_text(ty)),
            ),
            "super_interfaces" | "extends_interfaces" => names.extend(
                child
                    .named_children()
                    .filter(|list| list.is("type_list"))
                    .flat_map(|list| list.named_children())
                    .map(|ty| syntax::type_text(ty)),
            ),
            _ => {}
        }
    }
    names
}
