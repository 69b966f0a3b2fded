//! Minimal type model used for matching and import management.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Category of a resolved type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    /// A class, or a type of unknown category bound through an import.
    Class,
    /// An interface.
    Interface,
    /// An enum.
    Enum,
    /// An annotation type.
    Annotation,
    /// A primitive such as `int` or `boolean`, including `void`.
    Primitive,
    /// An array of another type.
    Array,
}

/// Handle to a resolved type: its fully-qualified name plus its category.
///
/// Nested types use dotted names (`java.util.Map.Entry`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeHandle {
    fqn: Arc<str>,
    kind: TypeKind,
}

impl TypeHandle {
    /// Creates a handle for `fqn` of the given kind.
    #[must_use]
    pub fn new(fqn: impl Into<Arc<str>>, kind: TypeKind) -> Self {
        Self {
            fqn: fqn.into(),
            kind,
        }
    }

    /// Creates a class handle.
    #[must_use]
    pub fn class(fqn: impl Into<Arc<str>>) -> Self {
        Self::new(fqn, TypeKind::Class)
    }

    /// Creates a primitive handle such as `int`.
    #[must_use]
    pub fn primitive(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, TypeKind::Primitive)
    }

    /// Creates a handle for an array whose elements have type `element`.
    #[must_use]
    pub fn array_of(element: &Self) -> Self {
        Self::new(format!("{}[]", element.fqn), TypeKind::Array)
    }

    /// Returns the fully-qualified name.
    #[must_use]
    pub fn fqn(&self) -> &str {
        &self.fqn
    }

    /// Returns the type category.
    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Returns the last segment of the fully-qualified name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        simple_name(&self.fqn)
    }

    /// Returns the package part of the name, or `""` for the default package.
    #[must_use]
    pub fn package_name(&self) -> &str {
        self.fqn.rsplit_once('.').map_or("", |(package, _)| package)
    }

    /// Returns whether this is a primitive type.
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive)
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqn)
    }
}

/// Returns the part of a dotted name after its last `.`.
#[must_use]
pub fn simple_name(fqn: &str) -> &str {
    fqn.rsplit_once('.').map_or(fqn, |(_, name)| name)
}

/// A resolved method or constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MethodType {
    declaring: TypeHandle,
    name: Arc<str>,
    parameter_types: Vec<TypeHandle>,
    return_type: Option<TypeHandle>,
    overrides: Vec<TypeHandle>,
}

impl MethodType {
    /// Name used for constructors.
    pub const CONSTRUCTOR: &'static str = "<constructor>";

    /// Creates a method type declared on `declaring`.
    #[must_use]
    pub fn new(
        declaring: TypeHandle,
        name: impl Into<Arc<str>>,
        parameter_types: Vec<TypeHandle>,
        return_type: Option<TypeHandle>,
    ) -> Self {
        Self {
            declaring,
            name: name.into(),
            parameter_types,
            return_type,
            overrides: Vec::new(),
        }
    }

    /// Records the supertypes whose same-signature method this one overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Vec<TypeHandle>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Returns the type that declares the method.
    #[must_use]
    pub const fn declaring(&self) -> &TypeHandle {
        &self.declaring
    }

    /// Returns the method name, or [`Self::CONSTRUCTOR`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared parameter types in order.
    #[must_use]
    pub fn parameter_types(&self) -> &[TypeHandle] {
        &self.parameter_types
    }

    /// Returns the return type; `None` for constructors.
    #[must_use]
    pub const fn return_type(&self) -> Option<&TypeHandle> {
        self.return_type.as_ref()
    }

    /// Returns the supertypes declaring a method this one overrides.
    #[must_use]
    pub fn overrides(&self) -> &[TypeHandle] {
        &self.overrides
    }

    /// Returns whether this is a constructor.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        &*self.name == Self::CONSTRUCTOR
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.declaring, self.name)?;
        for (index, param) in self.parameter_types.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}

/// Type information attached to a node by a type attributor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TypeAttribution {
    /// The node denotes or evaluates to a type.
    Type(TypeHandle),
    /// The node invokes or declares a method.
    Method(Arc<MethodType>),
}

impl TypeAttribution {
    /// Returns the type the node evaluates to.
    ///
    /// For methods this is the return type, or the declaring type for
    /// constructors.
    #[must_use]
    pub fn value_type(&self) -> Option<&TypeHandle> {
        match self {
            Self::Type(handle) => Some(handle),
            Self::Method(method) if method.is_constructor() => Some(method.declaring()),
            Self::Method(method) => method.return_type(),
        }
    }
}
