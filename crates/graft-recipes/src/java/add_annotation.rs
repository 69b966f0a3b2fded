//! Adds an annotation to classes, optionally only to classes carrying
//! another annotation in files using a given type.

use std::sync::Arc;

use graft_core::{
    Accumulator, AllPreconditions, Cursor, ExecutionContext, Node, Precondition, Recipe,
    RecipeError, TreeVisitor, check, simple_name,
};
use graft_java::{
    AnnotationMatcher, Coordinates, JavaTemplate, JavaVisitor, SnippetContext, TypePattern,
    UsesType, java, syntax, visit_children,
};
use serde::{Deserialize, Serialize};

use super::{invalid_pattern, skip_edit};

/// Options for [`AddClassAnnotation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddClassAnnotationOptions {
    /// Required. Fully-qualified annotation to add, e.g.
    /// `org.junit.jupiter.api.Disabled`.
    pub annotation_type: String,
    /// Optional. Only classes carrying a matching annotation change, e.g.
    /// `@org.springframework.boot.test.context.SpringBootTest`.
    #[serde(default)]
    pub if_annotated_with: Option<String>,
    /// Optional. Only files referring to a matching type change, e.g.
    /// `org.springframework.boot..TestRestTemplate`.
    #[serde(default)]
    pub if_uses_type: Option<String>,
}

/// Adds an annotation, placed alphabetically among the existing ones, to
/// every class that qualifies and does not carry it yet.
pub struct AddClassAnnotation {
    name: String,
    display_name: String,
    options: AddClassAnnotationOptions,
    template: JavaTemplate,
    annotated_with: Option<AnnotationMatcher>,
    uses: Option<UsesType>,
}

impl AddClassAnnotation {
    /// Registered recipe name.
    pub const NAME: &'static str = "graft.java.AddClassAnnotation";

    /// Builds the recipe.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError`] for malformed types or patterns.
    pub fn new(options: AddClassAnnotationOptions) -> Result<Self, RecipeError> {
        Self::named(Self::NAME, "Add a class annotation", options)
    }

    fn named(
        name: &str,
        display_name: &str,
        options: AddClassAnnotationOptions,
    ) -> Result<Self, RecipeError> {
        let fqn = options.annotation_type.trim().trim_start_matches('@');
        if TypePattern::new(fqn)
            .ok()
            .and_then(|pattern| pattern.exact().map(str::to_owned))
            .is_none()
        {
            return Err(RecipeError::invalid_option(
                name,
                "annotationType",
                "expected a fully-qualified type without wildcards",
            ));
        }
        let template = JavaTemplate::builder(format!("@{}", simple_name(fqn)))
            .context(SnippetContext::Annotation)
            .imports([fqn])
            .build()
            .map_err(|err| RecipeError::configuration(name, err.to_string()))?;
        let annotated_with = options
            .if_annotated_with
            .as_deref()
            .map(AnnotationMatcher::new)
            .transpose()
            .map_err(|err| invalid_pattern(name, "ifAnnotatedWith", &err))?;
        let uses = options
            .if_uses_type
            .as_deref()
            .map(UsesType::new)
            .transpose()
            .map_err(|err| invalid_pattern(name, "ifUsesType", &err))?;
        Ok(Self {
            name: name.to_owned(),
            display_name: display_name.to_owned(),
            options: AddClassAnnotationOptions {
                annotation_type: fqn.to_owned(),
                ..options
            },
            template,
            annotated_with,
            uses,
        })
    }

    /// Returns the options the recipe was built from.
    #[must_use]
    pub const fn options(&self) -> &AddClassAnnotationOptions {
        &self.options
    }

    fn already_annotated(&self, declaration: &Node) -> bool {
        let fqn = self.options.annotation_type.as_str();
        let simple = simple_name(fqn);
        syntax::annotations(declaration).any(|annotation| {
            annotation.type_handle().is_some_and(|handle| handle.fqn() == fqn)
                || syntax::annotation_name(annotation)
                    .is_some_and(|written| written == fqn || written == simple)
        })
    }

    fn qualifies(&self, declaration: &Node) -> bool {
        declaration.is("class_declaration")
            && !self.already_annotated(declaration)
            && self
                .annotated_with
                .as_ref()
                .is_none_or(|matcher| matcher.annotates(declaration))
    }
}

impl Recipe for AddClassAnnotation {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        "Adds an annotation to qualifying classes and imports it."
    }

    fn editor<'a>(&'a self, _acc: Option<&'a Accumulator>) -> Option<Box<dyn TreeVisitor + 'a>> {
        let uses: Vec<Box<dyn Precondition>> = self
            .uses
            .iter()
            .map(|uses| Box::new(uses.clone()) as Box<dyn Precondition>)
            .collect();
        Some(check(
            AllPreconditions::new(uses),
            java(AnnotateClasses { recipe: self }),
        ))
    }
}

struct AnnotateClasses<'a> {
    recipe: &'a AddClassAnnotation,
}

impl JavaVisitor for AnnotateClasses<'_> {
    fn name(&self) -> &str {
        &self.recipe.name
    }

    fn visit_class_declaration(
        &mut self,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Arc<Node> {
        let visited = visit_children(self, cursor, ctx);
        if !self.recipe.qualifies(&visited) {
            return visited;
        }
        let target = cursor.with_value(Arc::clone(&visited));
        match self
            .recipe
            .template
            .apply(&target, Coordinates::AddAnnotation, &[], ctx)
        {
            Ok(annotated) => annotated,
            Err(err) => {
                skip_edit(ctx, &self.recipe.name, &err);
                visited
            }
        }
    }
}

/// Spring Boot 4 moved `TestRestTemplate` support out of `@SpringBootTest`:
/// tests that use it need `@AutoConfigureTestRestTemplate`.
pub struct AddAutoConfigureTestRestTemplate;

impl AddAutoConfigureTestRestTemplate {
    /// Registered recipe name.
    pub const NAME: &'static str = "graft.java.spring.AddAutoConfigureTestRestTemplate";

    /// The annotation added.
    pub const ANNOTATION: &'static str =
        "org.springframework.boot.resttestclient.autoconfigure.AutoConfigureTestRestTemplate";

    /// Builds the preset.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError`] only if the built-in template fails to
    /// compile.
    pub fn recipe() -> Result<AddClassAnnotation, RecipeError> {
        AddClassAnnotation::named(
            Self::NAME,
            "Add @AutoConfigureTestRestTemplate",
            AddClassAnnotationOptions {
                annotation_type: Self::ANNOTATION.to_owned(),
                if_annotated_with: Some(
                    "@org.springframework.boot.test.context.SpringBootTest".to_owned(),
                ),
                if_uses_type: Some("org.springframework.boot..TestRestTemplate".to_owned()),
            },
        )
    }
}
