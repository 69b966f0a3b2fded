//! Upgrades Maven dependency versions, following `${property}` references
//! across the poms of a build.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use graft_core::{
    Cursor, ExecutionContext, Marker, Node, RecipeError, RunConfig, ScanningRecipe, SourceFile,
    TreeMatcher, TreeVisitor,
};
use graft_markup::xml::{self, XPathMatcher, XmlVisitor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::metadata::{MetadataSource, fetch_with_retries};
use super::version::{compare_versions, latest_release};
use crate::error::MetadataError;

/// `newVersion` value selecting the newest published release.
pub const LATEST_RELEASE: &str = "latest.release";

const DEPENDENCIES: &str = "/project//dependencies/dependency";
const PROPERTIES: &str = "/project/properties/*";

/// Options for [`UpgradeDependencyVersion`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpgradeDependencyVersionOptions {
    /// Required. Group id, `*` allowed, e.g. `org.springframework.boot`.
    pub group_id: String,
    /// Required. Artifact id, `*` allowed, e.g. `spring-boot-*`.
    pub artifact_id: String,
    /// Required. An exact version such as `3.2.5`, or `latest.release`.
    pub new_version: String,
    /// Optional, defaults to the run's scan retries (3). Metadata lookups
    /// attempted per artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
}

/// What the scan learned: one target per artifact and the properties that
/// hold versions of matched artifacts.
#[derive(Debug, Default)]
pub struct Resolutions {
    targets: DashMap<(String, String), Result<String, MetadataError>>,
    properties: DashMap<String, String>,
}

impl Resolutions {
    fn require_property(&self, name: &str, target: &str) {
        self.properties
            .entry(name.to_owned())
            .and_modify(|known| {
                if compare_versions(known, target) == Ordering::Less {
                    target.clone_into(known);
                }
            })
            .or_insert_with(|| target.to_owned());
    }
}

/// Raises matching dependency versions, written inline or through a
/// property, to a fixed version or the newest release.
///
/// Versions never go down. Metadata failures do not abort the run: the
/// affected dependency gets a warning marker instead.
pub struct UpgradeDependencyVersion {
    options: UpgradeDependencyVersionOptions,
    source: Arc<dyn MetadataSource>,
    dependencies: XPathMatcher,
    properties: XPathMatcher,
}

impl fmt::Debug for UpgradeDependencyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpgradeDependencyVersion")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl UpgradeDependencyVersion {
    /// Registered recipe name.
    pub const NAME: &'static str = "graft.maven.UpgradeDependencyVersion";

    /// Builds the recipe around a metadata source.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError`] when a coordinate or the new version is
    /// empty.
    pub fn new(
        options: UpgradeDependencyVersionOptions,
        source: Arc<dyn MetadataSource>,
    ) -> Result<Self, RecipeError> {
        for (option, value) in [
            ("groupId", &options.group_id),
            ("artifactId", &options.artifact_id),
            ("newVersion", &options.new_version),
        ] {
            if value.trim().is_empty() {
                return Err(RecipeError::missing_option(Self::NAME, option));
            }
        }
        let invalid = |err: graft_markup::MarkupError| {
            RecipeError::configuration(Self::NAME, err.to_string())
        };
        Ok(Self {
            options,
            source,
            dependencies: XPathMatcher::new(DEPENDENCIES).map_err(invalid)?,
            properties: XPathMatcher::new(PROPERTIES).map_err(invalid)?,
        })
    }

    /// Returns the options the recipe was built from.
    #[must_use]
    pub const fn options(&self) -> &UpgradeDependencyVersionOptions {
        &self.options
    }

    fn selects(&self, group: &str, artifact: &str) -> bool {
        glob_matches(&self.options.group_id, group)
            && glob_matches(&self.options.artifact_id, artifact)
    }

    fn resolve(&self, group: &str, artifact: &str) -> Result<String, MetadataError> {
        if self.options.new_version != LATEST_RELEASE {
            return Ok(self.options.new_version.clone());
        }
        let attempts = self
            .options
            .retries
            .unwrap_or_else(|| RunConfig::default().scan_retries());
        let versions = fetch_with_retries(self.source.as_ref(), group, artifact, attempts)?;
        latest_release(versions.iter().map(String::as_str))
            .map(str::to_owned)
            .ok_or_else(|| MetadataError::no_release(format!("{group}:{artifact}")))
    }
}

/// Matches `text` against a pattern where `*` stands for any run of
/// characters.
fn glob_matches(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return pattern == text;
    };
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };
    let tail: Vec<&str> = parts.collect();
    let Some((last, middle)) = tail.split_last() else {
        return rest.is_empty();
    };
    for part in middle {
        let Some(at) = rest.find(part) else {
            return false;
        };
        rest = rest.get(at + part.len()..).unwrap_or_default();
    }
    rest.ends_with(last)
}

fn is_pom(file: &SourceFile) -> bool {
    file.path().file_name() == Some("pom.xml")
}

/// Coordinates and version text of a `<dependency>` element.
struct Dependency {
    group: String,
    artifact: String,
    version: Option<String>,
}

impl Dependency {
    fn read(element: &Node) -> Option<Self> {
        Some(Self {
            group: xml::child_text(element, "groupId")?,
            artifact: xml::child_text(element, "artifactId")?,
            version: xml::child_text(element, "version"),
        })
    }

    fn key(&self) -> (String, String) {
        (self.group.clone(), self.artifact.clone())
    }

    fn property(&self) -> Option<&str> {
        self.version
            .as_deref()?
            .strip_prefix("${")?
            .strip_suffix('}')
    }
}

impl ScanningRecipe for UpgradeDependencyVersion {
    type Acc = Resolutions;

    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Upgrade Maven dependency version"
    }

    fn description(&self) -> &str {
        "Raises the version of matching Maven dependencies, including versions held in properties."
    }

    fn initial_value(&self) -> Resolutions {
        Resolutions::default()
    }

    fn scanner<'a>(&'a self, acc: &'a Resolutions) -> Box<dyn TreeVisitor + 'a> {
        xml::xml(ScanPom { recipe: self, acc })
    }

    fn editor<'a>(&'a self, acc: &'a Resolutions) -> Option<Box<dyn TreeVisitor + 'a>> {
        Some(xml::xml(EditPom { recipe: self, acc }))
    }
}

struct ScanPom<'a> {
    recipe: &'a UpgradeDependencyVersion,
    acc: &'a Resolutions,
}

impl XmlVisitor for ScanPom<'_> {
    fn name(&self) -> &str {
        UpgradeDependencyVersion::NAME
    }

    fn is_acceptable(&self, file: &SourceFile, _ctx: &ExecutionContext) -> bool {
        is_pom(file)
    }

    fn visit_tag(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        if !self.recipe.dependencies.matches(cursor) {
            return xml::visit_children(self, cursor, ctx);
        }
        let element = cursor.value();
        let Some(dependency) = Dependency::read(element) else {
            return Arc::clone(element);
        };
        if !self.recipe.selects(&dependency.group, &dependency.artifact) {
            return Arc::clone(element);
        }
        let target = self
            .acc
            .targets
            .entry(dependency.key())
            .or_insert_with(|| {
                info!(
                    group = %dependency.group,
                    artifact = %dependency.artifact,
                    "resolving dependency version"
                );
                self.recipe.resolve(&dependency.group, &dependency.artifact)
            })
            .value()
            .clone();
        if let (Some(property), Ok(version)) = (dependency.property(), target) {
            self.acc.require_property(property, &version);
        }
        Arc::clone(element)
    }
}

struct EditPom<'a> {
    recipe: &'a UpgradeDependencyVersion,
    acc: &'a Resolutions,
}

impl EditPom<'_> {
    fn upgrade_dependency(&self, element: &Arc<Node>, ctx: &ExecutionContext) -> Arc<Node> {
        let Some(dependency) = Dependency::read(element) else {
            return Arc::clone(element);
        };
        let Some(target) = self
            .acc
            .targets
            .get(&dependency.key())
            .map(|entry| entry.value().clone())
        else {
            return Arc::clone(element);
        };
        let version = match target {
            Ok(version) => version,
            Err(err) => {
                let marker = Marker::warning(err.to_string());
                if element.markers().contains(&marker) {
                    return Arc::clone(element);
                }
                return Arc::new(element.with_marker(marker));
            }
        };
        if dependency.property().is_some() {
            return Arc::clone(element);
        }
        let Some(current) = xml::child_element(element, "version") else {
            return Arc::clone(element);
        };
        if compare_versions(&xml::text(current), &version) != Ordering::Less {
            return Arc::clone(element);
        }
        debug!(
            path = %ctx.source_path(),
            group = %dependency.group,
            artifact = %dependency.artifact,
            to = %version,
            "upgrading dependency"
        );
        let replacement = Arc::new(xml::with_text(current, &version));
        element
            .replace_descendant(current.id(), &replacement)
            .map_or_else(|| Arc::clone(element), Arc::new)
    }

    fn upgrade_property(&self, element: &Arc<Node>, ctx: &ExecutionContext) -> Arc<Node> {
        let Some(name) = xml::tag_name(element) else {
            return Arc::clone(element);
        };
        let Some(target) = self.acc.properties.get(name).map(|entry| entry.value().clone()) else {
            return Arc::clone(element);
        };
        if compare_versions(&xml::text(element), &target) != Ordering::Less {
            return Arc::clone(element);
        }
        debug!(path = %ctx.source_path(), property = name, to = %target, "upgrading version property");
        Arc::new(xml::with_text(element, &target))
    }
}

impl XmlVisitor for EditPom<'_> {
    fn name(&self) -> &str {
        UpgradeDependencyVersion::NAME
    }

    fn is_acceptable(&self, file: &SourceFile, _ctx: &ExecutionContext) -> bool {
        is_pom(file)
    }

    fn visit_tag(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        if self.recipe.dependencies.matches(cursor) {
            return self.upgrade_dependency(cursor.value(), ctx);
        }
        if self.recipe.properties.matches(cursor) {
            return self.upgrade_property(cursor.value(), ctx);
        }
        xml::visit_children(self, cursor, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maven::StaticMetadataSource;
    use crate::testing::{RewriteTest, after, unchanged};
    use graft_core::{Recipe, Scanning};
    use mockall::mock;
    use rstest::rstest;

    mock! {
        Source {}
        impl MetadataSource for Source {
            fn versions(&self, group: &str, artifact: &str) -> Result<Vec<String>, MetadataError>;
        }
    }

    const PARENT: &str = "<project>\n  <properties>\n    <boot.version>3.1.0</boot.version>\n  </properties>\n</project>\n";
    const PARENT_UPGRADED: &str = "<project>\n  <properties>\n    <boot.version>3.2.5</boot.version>\n  </properties>\n</project>\n";
    const CHILD: &str = "<project>\n  <dependencies>\n    <dependency>\n      <groupId>org.springframework.boot</groupId>\n      <artifactId>spring-boot-starter-web</artifactId>\n      <version>${boot.version}</version>\n    </dependency>\n  </dependencies>\n</project>\n";

    fn inline(version: &str) -> String {
        format!(
            "<project>\n  <dependencies>\n    <dependency>\n      <groupId>org.springframework.boot</groupId>\n      <artifactId>spring-boot-starter-web</artifactId>\n      <version>{version}</version>\n    </dependency>\n  </dependencies>\n</project>\n"
        )
    }

    fn upgrade(new_version: &str, source: Arc<dyn MetadataSource>) -> RewriteTest {
        let recipe = UpgradeDependencyVersion::new(
            UpgradeDependencyVersionOptions {
                group_id: "org.springframework.boot".to_owned(),
                artifact_id: "spring-boot-*".to_owned(),
                new_version: new_version.to_owned(),
                retries: Some(3),
            },
            source,
        )
        .expect("recipe");
        RewriteTest::new(Arc::new(Scanning(recipe)))
    }

    fn published() -> Arc<dyn MetadataSource> {
        Arc::new(StaticMetadataSource::new().with_versions(
            "org.springframework.boot",
            "spring-boot-starter-web",
            &["3.1.0", "3.2.5", "3.3.0-RC1"],
        ))
    }

    #[test]
    fn upgrades_inline_versions_to_the_latest_release() {
        upgrade(LATEST_RELEASE, published())
            .rewrite_run(&[after("pom.xml", &inline("3.1.0"), &inline("3.2.5"))]);
    }

    #[rstest]
    #[case::newer("3.3.0")]
    #[case::same("3.2.5")]
    fn never_downgrades(#[case] current: &str) {
        upgrade("3.2.5", published()).rewrite_run(&[unchanged("pom.xml", &inline(current))]);
    }

    #[rstest]
    #[case::parent_first(true)]
    #[case::child_first(false)]
    fn follows_properties_across_poms(#[case] parent_first: bool) {
        let parent = after("pom.xml", PARENT, PARENT_UPGRADED);
        let child = unchanged("web/pom.xml", CHILD);
        let specs = if parent_first { [parent, child] } else { [child, parent] };
        upgrade(LATEST_RELEASE, published()).rewrite_run(&specs);
    }

    #[test]
    fn reports_unreachable_metadata_as_a_warning() {
        let mut source = MockSource::new();
        source.expect_versions().times(3).returning(|group, artifact| {
            Err(MetadataError::unavailable(format!("{group}:{artifact}"), "timed out"))
        });
        let pom = inline("3.1.0");
        let run = upgrade(LATEST_RELEASE, Arc::new(source)).run(&[("pom.xml", pom.as_str())]);

        assert!(run.is_converged());
        let result = run.results().first().expect("one result");
        assert_eq!(result.after().print(), pom);
        assert_eq!(
            result.warnings(),
            ["dependency metadata for org.springframework.boot:spring-boot-starter-web could not be downloaded: timed out"]
        );
    }

    #[test]
    fn requires_coordinates() {
        let err = UpgradeDependencyVersion::new(
            UpgradeDependencyVersionOptions {
                group_id: " ".to_owned(),
                artifact_id: "a".to_owned(),
                new_version: "1".to_owned(),
                retries: Some(1),
            },
            published(),
        )
        .expect_err("group is required");
        assert!(matches!(err, RecipeError::MissingOption { .. }));
        let scanning: Arc<dyn Recipe> = Arc::new(Scanning(
            UpgradeDependencyVersion::new(
                UpgradeDependencyVersionOptions {
                    group_id: "g".to_owned(),
                    artifact_id: "a".to_owned(),
                    new_version: "1".to_owned(),
                    retries: Some(1),
                },
                published(),
            )
            .expect("recipe"),
        ));
        assert_eq!(scanning.name(), UpgradeDependencyVersion::NAME);
    }

    #[rstest]
    #[case("spring-boot-*", "spring-boot-starter-web", true)]
    #[case("spring-*-web", "spring-boot-starter-web", true)]
    #[case("spring-boot-*", "spring-core", false)]
    #[case("*", "anything", true)]
    #[case("exact", "exact", true)]
    #[case("exact", "exactly", false)]
    fn matches_globs(#[case] pattern: &str, #[case] text: &str, #[case] expected: bool) {
        assert_eq!(glob_matches(pattern, text), expected);
    }
}
