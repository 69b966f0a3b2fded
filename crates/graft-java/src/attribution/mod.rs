//! Type attribution for Java trees.
//!
//! Attribution walks a compilation unit once, keeping lexical scopes for
//! parameters and locals, and annotates type references, expressions,
//! invocations and declarations with [`TypeAttribution`]s. Names that
//! cannot be bound stay unattributed; matchers treat them as non-matching.
//! Subtrees whose attribution did not change are shared with the input.

mod resolve;

use std::collections::HashMap;
use std::sync::Arc;

use graft_core::{Language, Node, SourceFile, TypeAttribution, TypeAttributor, TypeHandle};
use tracing::trace;

use crate::classpath::{ClassLookup, Classpath, TypeSpace, declared_classes, unboxed};
use crate::kind::{is_type_declaration, is_type_node};
use crate::names::{ImportScope, qualify};
use crate::syntax::{self, type_text};

pub(crate) use resolve::{handle_of, is_assignable};
use resolve::{NULL_TYPE, promote, resolve_constructor, resolve_method};

const STRING: &str = "java.lang.String";

/// Attributes Java files against a shared classpath.
#[derive(Debug, Clone)]
pub struct JavaAttributor {
    classpath: Arc<Classpath>,
}

impl JavaAttributor {
    /// Creates an attributor over `classpath`.
    #[must_use]
    pub const fn new(classpath: Arc<Classpath>) -> Self {
        Self { classpath }
    }

    /// Returns the classpath used for resolution.
    #[must_use]
    pub const fn classpath(&self) -> &Arc<Classpath> {
        &self.classpath
    }
}

impl TypeAttributor for JavaAttributor {
    fn language(&self) -> Language {
        Language::Java
    }

    fn attribute(&self, file: &SourceFile) -> Arc<Node> {
        attribute_root(file.root(), &self.classpath)
    }
}

/// Attributes the compilation unit rooted at `root`.
pub(crate) fn attribute_root(root: &Arc<Node>, classpath: &Classpath) -> Arc<Node> {
    let scope = ImportScope::of_compilation_unit(root);
    let local = declared_classes(root, &scope, classpath);
    let types = TypeSpace::new(classpath, local);
    let mut attributor = Attribution {
        scope: &scope,
        types: &types,
        classes: Vec::new(),
        frames: vec![HashMap::new()],
    };
    attributor.node(root, None)
}

enum Opened {
    Nothing,
    Frame,
    Class,
}

struct Attribution<'a> {
    scope: &'a ImportScope,
    types: &'a dyn ClassLookup,
    classes: Vec<TypeHandle>,
    frames: Vec<HashMap<String, Option<TypeHandle>>>,
}

impl Attribution<'_> {
    fn node(&mut self, node: &Arc<Node>, parent: Option<&'static str>) -> Arc<Node> {
        let opened = self.enter(node);
        let descend = !matches!(node.kind(), "import_declaration" | "package_declaration");

        let mut changed = false;
        let mut children = Vec::with_capacity(node.children().len());
        if descend {
            for child in node.children() {
                let visited = self.node(child, Some(node.kind()));
                if visited.is("local_variable_declaration") || visited.is("resource") {
                    self.declare_locals(&visited);
                }
                changed |= !Arc::ptr_eq(child, &visited);
                children.push(visited);
            }
        }
        let rebuilt = if changed {
            Arc::new(node.with_children(children))
        } else {
            Arc::clone(node)
        };

        let attribution = self.attribution_of(&rebuilt, parent);
        self.leave(opened);
        if rebuilt.attribution() == attribution.as_ref() {
            rebuilt
        } else {
            Arc::new(rebuilt.with_attribution(attribution))
        }
    }

    fn enter(&mut self, node: &Node) -> Opened {
        let kind = node.kind();
        if is_type_declaration(kind) {
            let Some(name) = syntax::declared_name(node) else {
                return Opened::Nothing;
            };
            let outer = self
                .classes
                .last()
                .map_or_else(|| self.scope.package().to_owned(), |c| c.fqn().to_owned());
            let fqn = qualify(&outer, &name);
            let handle = self
                .types
                .handle(&fqn)
                .unwrap_or_else(|| TypeHandle::class(fqn.as_str()));
            self.classes.push(handle);
            self.frames.push(HashMap::new());
            return Opened::Class;
        }
        if kind == "object_creation_expression" && node.child_of_kind("class_body").is_some() {
            if let Some(created) = node.child_by_field("type").and_then(|ty| self.resolve(&type_text(ty))) {
                self.classes.push(created);
                self.frames.push(HashMap::new());
                return Opened::Class;
            }
            return Opened::Nothing;
        }

        let mut frame = HashMap::new();
        match kind {
            "method_declaration" | "constructor_declaration" => {
                for (ty, name) in syntax::parameters(node).0 {
                    frame.insert(name, self.resolve(&ty));
                }
            }
            "enhanced_for_statement" => {
                let ty = node.child_by_field("type").map(|ty| type_text(ty));
                if let Some(name) = node.child_by_field("name") {
                    frame.insert(name.print_trimmed(), ty.and_then(|ty| self.resolve(&ty)));
                }
            }
            "catch_clause" => {
                if let Some(param) = node.child_of_kind("catch_formal_parameter") {
                    let ty = param
                        .child_of_kind("catch_type")
                        .and_then(|types| types.named_children().next())
                        .and_then(|ty| self.resolve(&type_text(ty)));
                    if let Some(name) = param.child_by_field("name") {
                        frame.insert(name.print_trimmed(), ty);
                    }
                }
            }
            "lambda_expression" => {
                if let Some(params) = node.child_by_field("parameters") {
                    if params.is("identifier") {
                        frame.insert(params.print_trimmed(), None);
                    } else if params.is("formal_parameters") {
                        for param in params.named_children() {
                            let ty = param.child_by_field("type").and_then(|ty| self.resolve(&type_text(ty)));
                            if let Some(name) = param.child_by_field("name") {
                                frame.insert(name.print_trimmed(), ty);
                            }
                        }
                    } else {
                        for param in params.named_children() {
                            frame.insert(param.print_trimmed(), None);
                        }
                    }
                }
            }
            "block" | "constructor_body" | "switch_block" | "for_statement"
            | "try_with_resources_statement" => {}
            _ => return Opened::Nothing,
        }
        self.frames.push(frame);
        Opened::Frame
    }

    fn leave(&mut self, opened: Opened) {
        match opened {
            Opened::Nothing => {}
            Opened::Frame => {
                self.frames.pop();
            }
            Opened::Class => {
                self.frames.pop();
                self.classes.pop();
            }
        }
    }

    fn declare_locals(&mut self, declaration: &Node) {
        let written = declaration.child_by_field("type").map(|ty| type_text(ty));
        let declarators: Vec<(String, Option<TypeHandle>)> = if declaration.is("resource") {
            declaration
                .child_by_field("name")
                .map(|name| {
                    let inferred = declaration.child_by_field("value").and_then(|v| value_type(v));
                    (name.print_trimmed(), inferred)
                })
                .into_iter()
                .collect()
        } else {
            declaration
                .children_by_field("declarator")
                .filter_map(|decl| {
                    let name = decl.child_by_field("name")?.print_trimmed();
                    let inferred = decl.child_by_field("value").and_then(|v| value_type(v));
                    Some((name, inferred))
                })
                .collect()
        };
        let declared = match written.as_deref() {
            None | Some("var") => None,
            Some(ty) => self.resolve(ty),
        };
        if let Some(frame) = self.frames.last_mut() {
            for (name, inferred) in declarators {
                frame.insert(name, declared.clone().or(inferred));
            }
        }
    }

    fn resolve(&self, written: &str) -> Option<TypeHandle> {
        self.scope.resolve(written, self.types)
    }

    fn variable(&self, name: &str) -> Option<Option<TypeHandle>> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).cloned())
    }

    fn field_type(&self, owner: &str, name: &str) -> Option<TypeHandle> {
        std::iter::once(owner.to_owned())
            .chain(self.types.supertypes_of(owner))
            .filter_map(|fqn| self.types.class(&fqn))
            .find_map(|info| info.fields().iter().find(|field| field.name() == name))
            .map(|field| handle_of(field.type_name(), self.types))
    }

    fn attribution_of(&self, node: &Node, parent: Option<&str>) -> Option<TypeAttribution> {
        let kind = node.kind();
        if is_type_declaration(kind) {
            return self.classes.last().cloned().map(TypeAttribution::Type);
        }
        if is_type_node(kind) {
            // Segments of a qualified type are attributed as a whole.
            if parent == Some("scoped_type_identifier") {
                return None;
            }
            return self.resolve(&type_text(node)).map(TypeAttribution::Type);
        }
        let typed = |name: &str| Some(TypeAttribution::Type(handle_of(name, self.types)));
        match kind {
            "import_declaration" => {
                let decl = syntax::import_of(node)?;
                if decl.is_static || decl.is_wildcard {
                    return None;
                }
                self.resolve(&decl.name).map(TypeAttribution::Type)
            }
            "method_declaration" | "constructor_declaration" => self.declared_method(node),
            "identifier" => self.identifier(node),
            "this" => self.classes.last().cloned().map(TypeAttribution::Type),
            "field_access" => self.field_access(node),
            "method_invocation" => self.invocation(node),
            "object_creation_expression" => self.creation(node),
            "marker_annotation" | "annotation" => {
                let name = syntax::annotation_name(node)?;
                self.resolve(&name).map(TypeAttribution::Type)
            }
            "decimal_integer_literal" | "hex_integer_literal" | "octal_integer_literal"
            | "binary_integer_literal" => {
                let text = node.print_trimmed();
                typed(if text.ends_with(['l', 'L']) { "long" } else { "int" })
            }
            "decimal_floating_point_literal" | "hex_floating_point_literal" => {
                let text = node.print_trimmed();
                typed(if text.ends_with(['f', 'F']) { "float" } else { "double" })
            }
            "true" | "false" | "instanceof_expression" => typed("boolean"),
            "character_literal" => typed("char"),
            "string_literal" | "text_block" => typed(STRING),
            "null_literal" => Some(TypeAttribution::Type(TypeHandle::class(NULL_TYPE))),
            "class_literal" => typed("java.lang.Class"),
            "parenthesized_expression" => node
                .named_children()
                .next()
                .and_then(|inner| value_type(inner))
                .map(TypeAttribution::Type),
            "cast_expression" => node
                .child_by_field("type")
                .and_then(|ty| self.resolve(&type_text(ty)))
                .map(TypeAttribution::Type),
            "ternary_expression" => node
                .child_by_field("consequence")
                .and_then(|inner| value_type(inner))
                .map(TypeAttribution::Type),
            "assignment_expression" => node
                .child_by_field("left")
                .and_then(|inner| value_type(inner))
                .map(TypeAttribution::Type),
            "update_expression" => node
                .named_children()
                .next()
                .and_then(|inner| value_type(inner))
                .map(TypeAttribution::Type),
            "unary_expression" => {
                if node.child_by_field("operator").is_some_and(|op| op.print_trimmed() == "!") {
                    return typed("boolean");
                }
                node.child_by_field("operand")
                    .and_then(|inner| value_type(inner))
                    .map(TypeAttribution::Type)
            }
            "array_access" => node
                .child_by_field("array")
                .and_then(|array| value_type(array))
                .and_then(|array| {
                    array
                        .fqn()
                        .strip_suffix("[]")
                        .map(|element| handle_of(element, self.types))
                })
                .map(TypeAttribution::Type),
            "binary_expression" => self.binary(node),
            _ => None,
        }
    }

    fn declared_method(&self, node: &Node) -> Option<TypeAttribution> {
        let owner = self.classes.last()?;
        let info = self.types.class(owner.fqn())?;
        let name = if node.is("constructor_declaration") {
            graft_core::MethodType::CONSTRUCTOR.to_owned()
        } else {
            syntax::declared_name(node)?
        };
        let params: Vec<String> = syntax::parameters(node)
            .0
            .into_iter()
            .map(|(ty, _)| self.resolve(&ty).map_or(ty, |h| h.fqn().to_owned()))
            .collect();
        let method = info
            .methods()
            .iter()
            .find(|m| m.name() == name && m.parameters() == params.as_slice())?;
        let typed = resolve::method_type(info, method, self.types);
        Some(TypeAttribution::Method(Arc::new(typed)))
    }

    fn identifier(&self, node: &Node) -> Option<TypeAttribution> {
        // Declaration names, member names and qualified name segments are
        // attributed through their parent.
        if node.field().is_some_and(|field| matches!(field, "name" | "field" | "key")) {
            return None;
        }
        let name = node.print_trimmed();
        if let Some(local) = self.variable(&name) {
            return local.map(TypeAttribution::Type);
        }
        let member = self
            .classes
            .iter()
            .rev()
            .find_map(|class| self.field_type(class.fqn(), &name))
            .or_else(|| {
                self.scope
                    .static_owners(&name)
                    .iter()
                    .find_map(|owner| self.field_type(owner, &name))
            });
        if let Some(ty) = member {
            return Some(TypeAttribution::Type(ty));
        }
        // A bare type name used as a static receiver.
        if name.starts_with(|c: char| c.is_ascii_uppercase()) {
            return self.resolve(&name).map(TypeAttribution::Type);
        }
        None
    }

    fn field_access(&self, node: &Node) -> Option<TypeAttribution> {
        let field = node.child_by_field("field")?.print_trimmed();
        let object = node.child_by_field("object")?;
        if object.is("super") {
            let current = self.classes.last()?;
            let parent = self.types.supertypes_of(current.fqn()).into_iter().next()?;
            return self.field_type(&parent, &field).map(TypeAttribution::Type);
        }
        if let Some(owner) = value_type(object) {
            if let Some(ty) = self.field_type(owner.fqn(), &field) {
                return Some(TypeAttribution::Type(ty));
            }
        }
        // A qualified type name such as `java.util.concurrent.TimeUnit`.
        let qualified = syntax::compact(&node.print_trimmed());
        self.types
            .handle(&qualified)
            .or_else(|| {
                field
                    .starts_with(|c: char| c.is_ascii_uppercase())
                    .then(|| self.scope.resolve(&qualified, self.types))
                    .flatten()
                    .filter(|handle| self.types.class(handle.fqn()).is_some())
            })
            .map(TypeAttribution::Type)
    }

    fn arguments(node: &Node) -> Option<Vec<TypeHandle>> {
        node.child_by_field("arguments")?
            .named_children()
            .map(|arg| value_type(arg))
            .collect()
    }

    fn invocation(&self, node: &Node) -> Option<TypeAttribution> {
        let name = node.child_by_field("name")?.print_trimmed();
        let arguments = Self::arguments(node)?;
        let receivers: Vec<String> = match node.child_by_field("object") {
            Some(object) if object.is("super") => {
                let current = self.classes.last()?;
                self.types
                    .supertypes_of(current.fqn())
                    .into_iter()
                    .take(1)
                    .collect()
            }
            Some(object) => vec![value_type(object)?.fqn().to_owned()],
            None => self
                .classes
                .iter()
                .rev()
                .map(|class| class.fqn().to_owned())
                .chain(self.scope.static_owners(&name))
                .collect(),
        };
        let method = receivers
            .iter()
            .find_map(|receiver| resolve_method(receiver, &name, &arguments, self.types));
        if method.is_none() {
            trace!(method = %name, receivers = ?receivers, "unresolved invocation");
        }
        method.map(TypeAttribution::Method)
    }

    fn creation(&self, node: &Node) -> Option<TypeAttribution> {
        let created = self.resolve(&type_text(node.child_by_field("type")?))?;
        let constructor = Self::arguments(node)
            .and_then(|arguments| resolve_constructor(created.fqn(), &arguments, self.types));
        Some(constructor.map_or(TypeAttribution::Type(created), TypeAttribution::Method))
    }

    fn binary(&self, node: &Node) -> Option<TypeAttribution> {
        let operator = node.child_by_field("operator")?.print_trimmed();
        let typed = |name: &str| Some(TypeAttribution::Type(handle_of(name, self.types)));
        match operator.as_str() {
            "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||" => return typed("boolean"),
            _ => {}
        }
        let left = node.child_by_field("left").and_then(|n| value_type(n))?;
        let right = node.child_by_field("right").and_then(|n| value_type(n))?;
        if operator == "+" && (left.fqn() == STRING || right.fqn() == STRING) {
            return typed(STRING);
        }
        let primitive = |handle: &TypeHandle| {
            if handle.is_primitive() {
                Some(handle.fqn().to_owned())
            } else {
                unboxed(handle.fqn()).map(str::to_owned)
            }
        };
        let (lhs, rhs) = (primitive(&left)?, primitive(&right)?);
        if lhs == "boolean" && rhs == "boolean" {
            return typed("boolean");
        }
        if matches!(operator.as_str(), "<<" | ">>" | ">>>") {
            return typed(promote(&lhs, "int"));
        }
        typed(promote(&lhs, &rhs))
    }
}

/// Returns the type of the value an attributed expression produces.
#[must_use]
pub fn value_type(node: &Node) -> Option<TypeHandle> {
    node.attribution()
        .and_then(TypeAttribution::value_type)
        .cloned()
}

#[cfg(test)]
mod tests;
