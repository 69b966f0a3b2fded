//! Classification of Tree-sitter Java node kinds.

/// The node families Java visitors dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JavaKind {
    /// `program`, the compilation unit.
    CompilationUnit,
    /// `import_declaration`.
    Import,
    /// Any class-like declaration: class, interface, enum, record or
    /// annotation type.
    ClassDeclaration,
    /// `method_declaration` or `constructor_declaration`.
    MethodDeclaration,
    /// `field_declaration` or `local_variable_declaration`.
    VariableDeclaration,
    /// `block` or `constructor_body`.
    Block,
    /// `method_invocation`.
    MethodInvocation,
    /// `object_creation_expression`.
    NewClass,
    /// `field_access`.
    FieldAccess,
    /// `identifier` or `type_identifier`.
    Identifier,
    /// `annotation` or `marker_annotation`.
    Annotation,
    /// Any literal expression.
    Literal,
    /// Everything else.
    Other,
}

impl JavaKind {
    /// Classifies a Tree-sitter node kind.
    #[must_use]
    pub fn of(kind: &str) -> Self {
        match kind {
            "program" => Self::CompilationUnit,
            "import_declaration" => Self::Import,
            kind if is_type_declaration(kind) => Self::ClassDeclaration,
            "method_declaration" | "constructor_declaration" => Self::MethodDeclaration,
            "field_declaration" | "local_variable_declaration" => Self::VariableDeclaration,
            "block" | "constructor_body" => Self::Block,
            "method_invocation" => Self::MethodInvocation,
            "object_creation_expression" => Self::NewClass,
            "field_access" => Self::FieldAccess,
            "identifier" | "type_identifier" => Self::Identifier,
            "annotation" | "marker_annotation" => Self::Annotation,
            kind if is_literal(kind) => Self::Literal,
            _ => Self::Other,
        }
    }
}

/// Returns whether `kind` declares a class-like type.
#[must_use]
pub fn is_type_declaration(kind: &str) -> bool {
    matches!(
        kind,
        "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "annotation_type_declaration"
    )
}

/// Returns whether `kind` is a literal expression.
#[must_use]
pub fn is_literal(kind: &str) -> bool {
    matches!(
        kind,
        "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal"
            | "decimal_floating_point_literal"
            | "hex_floating_point_literal"
            | "string_literal"
            | "text_block"
            | "character_literal"
            | "true"
            | "false"
            | "null_literal"
    )
}

/// Returns whether `kind` denotes a type in source.
#[must_use]
pub fn is_type_node(kind: &str) -> bool {
    matches!(
        kind,
        "type_identifier"
            | "scoped_type_identifier"
            | "generic_type"
            | "array_type"
            | "integral_type"
            | "floating_point_type"
            | "boolean_type"
            | "void_type"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("program", JavaKind::CompilationUnit)]
    #[case("enum_declaration", JavaKind::ClassDeclaration)]
    #[case("constructor_declaration", JavaKind::MethodDeclaration)]
    #[case("marker_annotation", JavaKind::Annotation)]
    #[case("decimal_integer_literal", JavaKind::Literal)]
    #[case("argument_list", JavaKind::Other)]
    fn classifies_kinds(#[case] kind: &str, #[case] expected: JavaKind) {
        assert_eq!(JavaKind::of(kind), expected);
    }
}
