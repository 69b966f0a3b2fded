//! Known types available to attribution.
//!
//! A [`Classpath`] maps fully-qualified names to [`ClassInfo`] summaries:
//! supertypes, members and annotations. It starts from a small JDK baseline
//! and grows through the builder methods or by reading stub sources with
//! [`Classpath::from_sources`]. Nested types use dotted names such as
//! `java.util.Map.Entry`.

mod jdk;
mod stubs;

use std::collections::{HashMap, HashSet, VecDeque};

use graft_core::{TypeHandle, TypeKind};

pub(crate) use jdk::{boxed, unboxed};
pub(crate) use stubs::declared_classes;

/// Fully-qualified name of the root class.
pub const OBJECT: &str = "java.lang.Object";

/// A method or constructor signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    name: String,
    parameters: Vec<String>,
    return_type: Option<String>,
    is_static: bool,
    varargs: bool,
}

impl MethodInfo {
    /// Creates an instance method signature.
    #[must_use]
    pub fn new(name: impl Into<String>, parameters: &[&str], return_type: &str) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.iter().map(|p| (*p).to_owned()).collect(),
            return_type: Some(return_type.to_owned()),
            is_static: false,
            varargs: false,
        }
    }

    /// Creates a constructor signature.
    #[must_use]
    pub fn constructor(parameters: &[&str]) -> Self {
        Self {
            name: graft_core::MethodType::CONSTRUCTOR.to_owned(),
            parameters: parameters.iter().map(|p| (*p).to_owned()).collect(),
            return_type: None,
            is_static: false,
            varargs: false,
        }
    }

    pub(crate) fn from_parts(
        name: String,
        parameters: Vec<String>,
        return_type: Option<String>,
        is_static: bool,
        varargs: bool,
    ) -> Self {
        Self {
            name,
            parameters,
            return_type,
            is_static,
            varargs,
        }
    }

    /// Marks the method static.
    #[must_use]
    pub const fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Marks the last parameter as variable-arity.
    #[must_use]
    pub const fn into_varargs(mut self) -> Self {
        self.varargs = true;
        self
    }

    /// Returns the method name, or `<constructor>`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared parameter type names.
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Returns the return type name; `None` for constructors.
    #[must_use]
    pub fn return_type(&self) -> Option<&str> {
        self.return_type.as_deref()
    }

    /// Returns whether the method is static.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    /// Returns whether the last parameter is variable-arity.
    #[must_use]
    pub const fn is_varargs(&self) -> bool {
        self.varargs
    }

    /// Returns whether this is a constructor.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }
}

/// A field or enum constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    name: String,
    type_name: String,
    is_static: bool,
}

impl FieldInfo {
    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns whether the field is static.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }
}

/// Summary of one declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    handle: TypeHandle,
    supertypes: Vec<String>,
    methods: Vec<MethodInfo>,
    fields: Vec<FieldInfo>,
    annotations: Vec<String>,
}

impl ClassInfo {
    /// Creates a class summary.
    #[must_use]
    pub fn class(fqn: &str) -> Self {
        Self::of_kind(fqn, TypeKind::Class)
    }

    /// Creates an interface summary.
    #[must_use]
    pub fn interface(fqn: &str) -> Self {
        Self::of_kind(fqn, TypeKind::Interface)
    }

    /// Creates an enum summary.
    #[must_use]
    pub fn enumeration(fqn: &str) -> Self {
        Self::of_kind(fqn, TypeKind::Enum)
    }

    /// Creates an annotation type summary.
    #[must_use]
    pub fn annotation(fqn: &str) -> Self {
        Self::of_kind(fqn, TypeKind::Annotation)
    }

    /// Creates a summary of the given kind.
    #[must_use]
    pub fn of_kind(fqn: &str, kind: TypeKind) -> Self {
        Self {
            handle: TypeHandle::new(fqn, kind),
            supertypes: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Adds a direct supertype (superclass or interface).
    #[must_use]
    pub fn extends(mut self, fqn: &str) -> Self {
        self.supertypes.push(fqn.to_owned());
        self
    }

    /// Adds an instance method.
    #[must_use]
    pub fn method(self, name: &str, parameters: &[&str], return_type: &str) -> Self {
        self.with_method(MethodInfo::new(name, parameters, return_type))
    }

    /// Adds a static method.
    #[must_use]
    pub fn static_method(self, name: &str, parameters: &[&str], return_type: &str) -> Self {
        self.with_method(MethodInfo::new(name, parameters, return_type).into_static())
    }

    /// Adds a constructor.
    #[must_use]
    pub fn constructor(self, parameters: &[&str]) -> Self {
        self.with_method(MethodInfo::constructor(parameters))
    }

    /// Adds an arbitrary method signature.
    #[must_use]
    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    /// Adds an instance field.
    #[must_use]
    pub fn field(mut self, name: &str, type_name: &str) -> Self {
        self.fields.push(FieldInfo {
            name: name.to_owned(),
            type_name: type_name.to_owned(),
            is_static: false,
        });
        self
    }

    /// Adds a static field.
    #[must_use]
    pub fn static_field(mut self, name: &str, type_name: &str) -> Self {
        self.fields.push(FieldInfo {
            name: name.to_owned(),
            type_name: type_name.to_owned(),
            is_static: true,
        });
        self
    }

    /// Adds an enum constant, a static field of the enum's own type.
    #[must_use]
    pub fn constant(self, name: &str) -> Self {
        let own = self.handle.fqn().to_owned();
        self.static_field(name, &own)
    }

    /// Records an annotation present on the type.
    #[must_use]
    pub fn annotated(mut self, fqn: &str) -> Self {
        self.annotations.push(fqn.to_owned());
        self
    }

    /// Returns the handle for this type.
    #[must_use]
    pub const fn handle(&self) -> &TypeHandle {
        &self.handle
    }

    /// Returns the fully-qualified name.
    #[must_use]
    pub fn fqn(&self) -> &str {
        self.handle.fqn()
    }

    /// Returns the declared direct supertypes.
    #[must_use]
    pub fn supertypes(&self) -> &[String] {
        &self.supertypes
    }

    /// Returns the declared methods and constructors.
    #[must_use]
    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    /// Returns the declared fields.
    #[must_use]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Returns the annotations on the type declaration.
    #[must_use]
    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }

    /// Returns whether the type declares any constructor.
    #[must_use]
    pub fn declares_constructor(&self) -> bool {
        self.methods.iter().any(MethodInfo::is_constructor)
    }
}

/// Read access to class summaries, with supertype queries.
pub trait ClassLookup {
    /// Returns the summary for `fqn`.
    fn class(&self, fqn: &str) -> Option<&ClassInfo>;

    /// Returns every supertype of `fqn`, nearest first, ending with
    /// `java.lang.Object` for reference types. `fqn` itself is excluded.
    fn supertypes_of(&self, fqn: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue: VecDeque<String> = VecDeque::from([fqn.to_owned()]);
        while let Some(current) = queue.pop_front() {
            let Some(info) = self.class(&current) else {
                continue;
            };
            for parent in info.supertypes() {
                if parent != fqn && seen.insert(parent.clone()) {
                    order.push(parent.clone());
                    queue.push_back(parent.clone());
                }
            }
        }
        if fqn != OBJECT && !order.iter().any(|name| name == OBJECT) {
            order.push(OBJECT.to_owned());
        }
        order
    }

    /// Returns whether `sub` is `sup` or one of its subtypes.
    fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        sub == sup || self.supertypes_of(sub).iter().any(|name| name == sup)
    }

    /// Returns a handle for `fqn`, using the recorded kind when known.
    fn handle(&self, fqn: &str) -> Option<TypeHandle> {
        self.class(fqn).map(|info| info.handle().clone())
    }
}

/// The set of types visible to attribution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classpath {
    classes: HashMap<String, ClassInfo>,
}

impl Classpath {
    /// Creates an empty classpath, without even `java.lang`.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a classpath holding the JDK baseline.
    #[must_use]
    pub fn jdk() -> Self {
        jdk::baseline().into_iter().fold(Self::empty(), Self::with)
    }

    /// Adds or replaces a class summary.
    #[must_use]
    pub fn with(mut self, info: ClassInfo) -> Self {
        self.insert(info);
        self
    }

    /// Adds or replaces a class summary in place.
    pub fn insert(&mut self, info: ClassInfo) {
        self.classes.insert(info.fqn().to_owned(), info);
    }

    /// Returns whether `fqn` is known.
    #[must_use]
    pub fn contains(&self, fqn: &str) -> bool {
        self.classes.contains_key(fqn)
    }

    /// Returns the number of known types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns whether no types are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassLookup for Classpath {
    fn class(&self, fqn: &str) -> Option<&ClassInfo> {
        self.classes.get(fqn)
    }
}

/// A classpath overlaid with the types declared in one compilation unit.
pub(crate) struct TypeSpace<'a> {
    global: &'a Classpath,
    local: HashMap<String, ClassInfo>,
}

impl<'a> TypeSpace<'a> {
    pub(crate) fn new(global: &'a Classpath, local: Vec<ClassInfo>) -> Self {
        Self {
            global,
            local: local
                .into_iter()
                .map(|info| (info.fqn().to_owned(), info))
                .collect(),
        }
    }
}

impl ClassLookup for TypeSpace<'_> {
    fn class(&self, fqn: &str) -> Option<&ClassInfo> {
        self.local.get(fqn).or_else(|| self.global.class(fqn))
    }
}
