//! Java templates: snippets with placeholders compiled into tree fragments.
//!
//! A [`JavaTemplate`] holds a code snippet such as
//! `#{any(long)}, TimeUnit.#{}`. Applying it substitutes the arguments,
//! parses the result inside a synthetic compilation unit matching its
//! [`SnippetContext`], swaps the typed placeholders for the bound argument
//! subtrees and splices the fragment in at the requested [`Coordinates`].
//! Imports the template declares are queued through
//! [`crate::maybe_add_import`], so they only land when the fragment
//! actually refers to them. When the file already gives an imported type's
//! simple name another meaning, the fragment spells that type out in full
//! and no import is queued for it.

mod coordinates;
mod placeholder;
mod snippet;

use std::sync::Arc;

use dashmap::DashMap;
use graft_core::{Cursor, ExecutionContext, Node, simple_name};
use tracing::{debug, trace};

pub use coordinates::Coordinates;
pub use snippet::SnippetContext;

use crate::attribution::{is_assignable, value_type};
use crate::classpath::Classpath;
use crate::error::TemplateError;
use crate::format::{IndentStyle, reindent};
use crate::imports::{maybe_add_import, simple_name_taken};
use crate::names::is_primitive;
use placeholder::{Placeholders, SlotKind, scan};

/// An argument bound to a placeholder.
#[derive(Debug, Clone)]
pub enum TemplateArg {
    /// A subtree from the file being edited.
    Node(Arc<Node>),
    /// Source text spliced in before parsing.
    Text(String),
}

impl From<&Arc<Node>> for TemplateArg {
    fn from(node: &Arc<Node>) -> Self {
        Self::Node(Arc::clone(node))
    }
}

impl From<Arc<Node>> for TemplateArg {
    fn from(node: Arc<Node>) -> Self {
        Self::Node(node)
    }
}

impl From<&str> for TemplateArg {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for TemplateArg {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl TemplateArg {
    fn source(&self) -> String {
        match self {
            Self::Node(node) => node.print_trimmed(),
            Self::Text(text) => text.clone(),
        }
    }
}

type FragmentCache = DashMap<(SnippetContext, String), Vec<Arc<Node>>>;

/// A compiled code snippet with placeholders.
#[derive(Debug, Clone)]
pub struct JavaTemplate {
    code: String,
    context: SnippetContext,
    imports: Vec<String>,
    classpath: Arc<Classpath>,
    placeholders: Placeholders,
    fragments: Arc<FragmentCache>,
}

/// Builder for [`JavaTemplate`].
#[derive(Debug, Clone)]
pub struct JavaTemplateBuilder {
    code: String,
    context: SnippetContext,
    imports: Vec<String>,
    classpath: Option<Arc<Classpath>>,
}

impl JavaTemplateBuilder {
    /// Sets where the snippet is meant to sit. Defaults to
    /// [`SnippetContext::Expression`].
    #[must_use]
    pub const fn context(mut self, context: SnippetContext) -> Self {
        self.context = context;
        self
    }

    /// Declares the types the snippet refers to by simple name.
    #[must_use]
    pub fn imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imports.extend(imports.into_iter().map(Into::into));
        self
    }

    /// Sets the classpath used to check typed placeholders. Defaults to the
    /// JDK baseline.
    #[must_use]
    pub fn classpath(mut self, classpath: Arc<Classpath>) -> Self {
        self.classpath = Some(classpath);
        self
    }

    /// Validates the snippet and builds the template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Configuration`] when a placeholder is
    /// malformed or the snippet does not parse in its context.
    pub fn build(self) -> Result<JavaTemplate, TemplateError> {
        let placeholders =
            scan(&self.code).map_err(|message| TemplateError::configuration(&self.code, message))?;
        let template = JavaTemplate {
            classpath: self.classpath.unwrap_or_else(|| Arc::new(Classpath::jdk())),
            code: self.code,
            context: self.context,
            imports: self.imports,
            placeholders,
            fragments: Arc::new(DashMap::new()),
        };
        let sample = template.substitute(str::to_owned, |binding, kind| match kind {
            SlotKind::Raw => format!("__graft_r{binding}__"),
            SlotKind::Typed { .. } => stand_in(binding),
        });
        snippet::parse(template.context, &sample, &template.imports)
            .map_err(|message| TemplateError::configuration(&template.code, message))?;
        Ok(template)
    }
}

fn stand_in(binding: usize) -> String {
    format!("__graft_p{binding}__")
}

fn binding_of(text: &str) -> Option<usize> {
    text.strip_prefix("__graft_p")?
        .strip_suffix("__")?
        .parse()
        .ok()
}

impl JavaTemplate {
    /// Starts building a template for `code`.
    #[must_use]
    pub fn builder(code: impl Into<String>) -> JavaTemplateBuilder {
        JavaTemplateBuilder {
            code: code.into(),
            context: SnippetContext::default(),
            imports: Vec::new(),
            classpath: None,
        }
    }

    /// Returns the snippet source.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the number of arguments [`Self::apply`] expects.
    #[must_use]
    pub const fn arity(&self) -> usize {
        self.placeholders.arity
    }

    /// Applies the template at `coordinates` relative to the cursor's node
    /// and returns the node that replaces it.
    ///
    /// Typed placeholders receive the argument subtrees themselves, so
    /// their formatting and identities are kept. Template imports are
    /// queued on `ctx`.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] when the arguments do not fit the
    /// placeholders, the substituted code does not parse, or the fragment
    /// cannot be placed at `coordinates`.
    pub fn apply(
        &self,
        cursor: &Cursor<'_>,
        coordinates: Coordinates,
        args: &[TemplateArg],
        ctx: &mut ExecutionContext,
    ) -> Result<Arc<Node>, TemplateError> {
        if args.len() != self.placeholders.arity {
            return Err(TemplateError::Arity {
                snippet: self.code.clone(),
                expected: self.placeholders.arity,
                actual: args.len(),
            });
        }
        self.check_arguments(args)?;

        let target = cursor.value();
        let root = cursor.root_value();
        let taken: Vec<&str> = self
            .imports
            .iter()
            .map(String::as_str)
            .filter(|fqn| simple_name_taken(root, fqn))
            .collect();
        if !taken.is_empty() {
            debug!(template = %self.code, imports = ?taken, "qualifying types whose simple names are taken");
        }

        let code = self.substitute(
            |literal| {
                taken
                    .iter()
                    .fold(literal.to_owned(), |text, fqn| qualify(&text, fqn))
            },
            |binding, kind| match kind {
                SlotKind::Raw => args.get(binding).map(TemplateArg::source).unwrap_or_default(),
                SlotKind::Typed { .. } => stand_in(binding),
            },
        );
        let fragment = self.compile(&code)?;

        let style = IndentStyle::detect(root);
        let base = coordinates.base_indent(target, root, style);
        let mut used = vec![false; args.len()];
        let nodes: Vec<Arc<Node>> = fragment
            .iter()
            .map(|node| {
                let indented = reindent(&node.with_fresh_ids(), &base, style);
                bind(&indented, args, &mut used)
            })
            .collect();
        let spliced = coordinates.splice(target, nodes, &base, style)?;

        for fqn in self.imports.iter().filter(|fqn| !taken.contains(&fqn.as_str())) {
            maybe_add_import(ctx, fqn);
        }
        debug!(template = %self.code, %coordinates, "applied template");
        Ok(spliced)
    }

    fn substitute(
        &self,
        literal: impl Fn(&str) -> String,
        mut replacement: impl FnMut(usize, &SlotKind) -> String,
    ) -> String {
        let mut out = String::with_capacity(self.code.len());
        let mut last = 0;
        for occurrence in &self.placeholders.occurrences {
            out.push_str(&literal(self.code.get(last..occurrence.start).unwrap_or_default()));
            out.push_str(&replacement(occurrence.binding, &occurrence.kind));
            last = occurrence.end;
        }
        out.push_str(&literal(self.code.get(last..).unwrap_or_default()));
        out
    }

    fn compile(&self, code: &str) -> Result<Vec<Arc<Node>>, TemplateError> {
        let key = (self.context, code.to_owned());
        if let Some(cached) = self.fragments.get(&key) {
            trace!(code, "template fragment cache hit");
            return Ok(cached.clone());
        }
        let nodes = snippet::parse(self.context, code, &self.imports).map_err(|message| {
            TemplateError::Parse {
                code: code.to_owned(),
                message,
            }
        })?;
        self.fragments.insert(key, nodes.clone());
        Ok(nodes)
    }

    fn check_arguments(&self, args: &[TemplateArg]) -> Result<(), TemplateError> {
        for occurrence in &self.placeholders.occurrences {
            let SlotKind::Typed { expected } = &occurrence.kind else {
                continue;
            };
            let index = occurrence.binding;
            let wanted = expected.as_deref().map(|name| self.expected_type(name));
            let describe = || wanted.clone().unwrap_or_else(|| "any type".to_owned());
            let Some(TemplateArg::Node(node)) = args.get(index) else {
                return Err(TemplateError::IncompatibleArgument {
                    index,
                    expected: describe(),
                    actual: "source text".to_owned(),
                });
            };
            let Some(target) = wanted.as_deref() else {
                continue;
            };
            let actual = value_type(node).ok_or_else(|| TemplateError::UnresolvedArgument {
                index,
                expected: describe(),
            })?;
            if !is_assignable(actual.fqn(), target, self.classpath.as_ref()) {
                return Err(TemplateError::IncompatibleArgument {
                    index,
                    expected: describe(),
                    actual: actual.fqn().to_owned(),
                });
            }
        }
        Ok(())
    }

    /// Resolves a placeholder's type name against the template imports.
    fn expected_type(&self, written: &str) -> String {
        if let Some(element) = written.strip_suffix("[]") {
            return format!("{}[]", self.expected_type(element));
        }
        let erased = written.split('<').next().unwrap_or(written).trim();
        if is_primitive(erased) || erased.contains('.') {
            return erased.to_owned();
        }
        if let Some(import) = self.imports.iter().find(|fqn| simple_name(fqn) == erased) {
            return import.clone();
        }
        let implicit = format!("java.lang.{erased}");
        if self.classpath.contains(&implicit) {
            implicit
        } else {
            erased.to_owned()
        }
    }
}

/// Replaces standalone uses of the simple name of `fqn` in template text
/// with `fqn` itself. Names after a `.` are member selections and stay.
fn qualify(text: &str, fqn: &str) -> String {
    let simple = simple_name(fqn);
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, _) in text.match_indices(simple) {
        let end = start + simple.len();
        let before = text.get(..start).and_then(|head| head.chars().next_back());
        let after = text.get(end..).and_then(|tail| tail.chars().next());
        if before.is_some_and(|c| c == '.' || is_ident(c)) || after.is_some_and(is_ident) {
            continue;
        }
        out.push_str(text.get(last..start).unwrap_or_default());
        out.push_str(fqn);
        last = end;
    }
    out.push_str(text.get(last..).unwrap_or_default());
    out
}

/// Swaps placeholder identifiers for the bound argument subtrees.
///
/// The first use of an argument keeps its identity; later uses get fresh
/// ids so no identity appears twice in the tree.
fn bind(node: &Node, args: &[TemplateArg], used: &mut [bool]) -> Arc<Node> {
    if let Some(index) = node.text().and_then(binding_of) {
        if let Some(TemplateArg::Node(arg)) = args.get(index) {
            let reused = used.get(index).copied().unwrap_or(false);
            if let Some(flag) = used.get_mut(index) {
                *flag = true;
            }
            let placed = arg.with_prefix(node.prefix()).with_field(node.field());
            return Arc::new(if reused { placed.with_fresh_ids() } else { placed });
        }
    }
    if node.children().is_empty() {
        return Arc::new(node.clone());
    }
    let children = node
        .children()
        .iter()
        .map(|child| bind(child, args, used))
        .collect();
    Arc::new(node.with_children(children))
}
