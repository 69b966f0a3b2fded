//! Method resolution and assignability.

use std::sync::Arc;

use graft_core::{MethodType, TypeHandle, TypeKind};

use crate::classpath::{ClassInfo, ClassLookup, MethodInfo, OBJECT, boxed, unboxed};
use crate::names::is_primitive;

/// Pseudo-type of the `null` literal.
pub(crate) const NULL_TYPE: &str = "null";

const WIDENING: &[(&str, &[&str])] = &[
    ("byte", &["short", "int", "long", "float", "double"]),
    ("short", &["int", "long", "float", "double"]),
    ("char", &["int", "long", "float", "double"]),
    ("int", &["long", "float", "double"]),
    ("long", &["float", "double"]),
    ("float", &["double"]),
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Strict,
    Boxing,
    Varargs,
}

/// Turns a type name recorded on the classpath into a handle.
pub(crate) fn handle_of(name: &str, types: &dyn ClassLookup) -> TypeHandle {
    if let Some(element) = name.strip_suffix("[]") {
        return TypeHandle::array_of(&handle_of(element, types));
    }
    if is_primitive(name) {
        return TypeHandle::primitive(name);
    }
    types
        .handle(name)
        .unwrap_or_else(|| TypeHandle::new(name, TypeKind::Class))
}

fn widens(from: &str, to: &str) -> bool {
    WIDENING
        .iter()
        .any(|(source, targets)| *source == from && targets.contains(&to))
}

fn assignable(from: &str, to: &str, phase: Phase, types: &dyn ClassLookup) -> bool {
    if from == to {
        return true;
    }
    let from_primitive = is_primitive(from);
    let to_primitive = is_primitive(to);
    match (from_primitive, to_primitive) {
        (true, true) => widens(from, to),
        (false, false) => {
            if from == NULL_TYPE || to == OBJECT {
                return true;
            }
            if from.ends_with("[]") || to.ends_with("[]") {
                return false;
            }
            types.is_subtype(from, to)
        }
        (true, false) => {
            phase != Phase::Strict
                && boxed(from).is_some_and(|b| b == to || types.is_subtype(b, to))
        }
        (false, true) => {
            phase != Phase::Strict
                && unboxed(from).is_some_and(|p| p == to || widens(p, to))
        }
    }
}

/// Returns whether a value of type `from` may be passed where `to` is
/// expected, boxing allowed.
pub(crate) fn is_assignable(from: &str, to: &str, types: &dyn ClassLookup) -> bool {
    assignable(from, to, Phase::Boxing, types)
}

fn applicable(
    method: &MethodInfo,
    arguments: &[TypeHandle],
    phase: Phase,
    types: &dyn ClassLookup,
) -> bool {
    let params = method.parameters();
    if phase == Phase::Varargs {
        if !method.is_varargs() || arguments.len() + 1 < params.len() {
            return false;
        }
        let (fixed, rest) = params.split_at(params.len() - 1);
        let element = rest
            .first()
            .and_then(|last| last.strip_suffix("[]"))
            .unwrap_or(OBJECT);
        return arguments.iter().enumerate().all(|(index, arg)| {
            let target = fixed.get(index).map_or(element, String::as_str);
            assignable(arg.fqn(), target, phase, types)
        });
    }
    params.len() == arguments.len()
        && params
            .iter()
            .zip(arguments)
            .all(|(param, arg)| assignable(arg.fqn(), param, phase, types))
}

fn more_specific(a: &MethodInfo, b: &MethodInfo, types: &dyn ClassLookup) -> bool {
    a.parameters().len() == b.parameters().len()
        && a.parameters()
            .iter()
            .zip(b.parameters())
            .all(|(x, y)| assignable(x, y, Phase::Strict, types))
}

/// A candidate found while searching a type hierarchy.
struct Candidate<'a> {
    declaring: &'a ClassInfo,
    method: &'a MethodInfo,
}

/// Resolves a call of `name` with `arguments` on `receiver`.
///
/// Searches the receiver and all of its supertypes, then applies Java's
/// three applicability phases and picks the most specific candidate.
/// Returns `None` when no candidate applies or the choice is ambiguous.
pub(crate) fn resolve_method(
    receiver: &str,
    name: &str,
    arguments: &[TypeHandle],
    types: &dyn ClassLookup,
) -> Option<Arc<MethodType>> {
    let mut hierarchy = vec![receiver.to_owned()];
    hierarchy.extend(types.supertypes_of(receiver));

    let candidates: Vec<Candidate<'_>> = hierarchy
        .iter()
        .filter_map(|fqn| types.class(fqn))
        .flat_map(|declaring| {
            declaring
                .methods()
                .iter()
                .filter(|method| method.name() == name)
                .map(move |method| Candidate { declaring, method })
        })
        .collect();

    for phase in [Phase::Strict, Phase::Boxing, Phase::Varargs] {
        let fitting: Vec<&Candidate<'_>> = candidates
            .iter()
            .filter(|c| applicable(c.method, arguments, phase, types))
            .collect();
        if fitting.is_empty() {
            continue;
        }
        let best = fitting.iter().find(|c| {
            fitting
                .iter()
                .all(|other| more_specific(c.method, other.method, types))
        })?;
        return Some(Arc::new(method_type(best.declaring, best.method, types)));
    }
    None
}

/// Resolves a constructor call on `class`.
pub(crate) fn resolve_constructor(
    class: &str,
    arguments: &[TypeHandle],
    types: &dyn ClassLookup,
) -> Option<Arc<MethodType>> {
    let info = types.class(class)?;
    if !info.declares_constructor() {
        return arguments.is_empty().then(|| {
            Arc::new(MethodType::new(
                info.handle().clone(),
                MethodType::CONSTRUCTOR,
                Vec::new(),
                None,
            ))
        });
    }
    resolve_method(class, MethodType::CONSTRUCTOR, arguments, types)
        .filter(|method| method.declaring().fqn() == class)
}

/// Builds the attributed type of a declared method, recording every
/// supertype that declares the same signature.
pub(crate) fn method_type(
    declaring: &ClassInfo,
    method: &MethodInfo,
    types: &dyn ClassLookup,
) -> MethodType {
    let parameters: Vec<TypeHandle> = method
        .parameters()
        .iter()
        .map(|name| handle_of(name, types))
        .collect();
    let return_type = method.return_type().map(|name| handle_of(name, types));
    let overrides = if method.is_constructor() {
        Vec::new()
    } else {
        types
            .supertypes_of(declaring.fqn())
            .iter()
            .filter_map(|fqn| types.class(fqn))
            .filter(|parent| {
                parent.methods().iter().any(|candidate| {
                    candidate.name() == method.name()
                        && candidate.parameters() == method.parameters()
                })
            })
            .map(|parent| parent.handle().clone())
            .collect()
    };
    MethodType::new(
        declaring.handle().clone(),
        method.name(),
        parameters,
        return_type,
    )
    .with_overrides(overrides)
}

/// Binary numeric promotion of two primitive operand types.
pub(crate) fn promote(left: &str, right: &str) -> &'static str {
    let rank = |name: &str| match name {
        "double" => 4,
        "float" => 3,
        "long" => 2,
        _ => 1,
    };
    match rank(left).max(rank(right)) {
        4 => "double",
        3 => "float",
        2 => "long",
        _ => "int",
    }
}
