//! Turning file contents into source files for a run.

use std::sync::Arc;

use camino::Utf8Path;
use graft_core::{Language, SourceFile};
use graft_java::{Classpath, JavaError, JavaParser};
use graft_markup::{properties, xml, yaml};
use tracing::warn;

use crate::error::SourceError;

/// Parses `text` with the parser its extension selects. Java files are
/// attributed against `classpath`.
///
/// # Errors
///
/// Returns [`SourceError::Unsupported`] for unknown extensions and the
/// parser's error otherwise.
pub fn parse_source(
    path: &Utf8Path,
    text: &str,
    classpath: &Arc<Classpath>,
) -> Result<SourceFile, SourceError> {
    let language = Language::from_path(path).ok_or_else(|| SourceError::Unsupported {
        path: path.to_owned(),
    })?;
    match language {
        Language::Java => Ok(JavaParser::new()?
            .with_classpath(Arc::clone(classpath))
            .parse(path, text)
            .map_err(JavaError::from)?),
        Language::Xml => Ok(xml::parse_xml(path, text)?),
        Language::Yaml => Ok(yaml::parse_yaml(path, text)?),
        Language::Properties => Ok(properties::parse_properties(path, text)?),
    }
}

/// Parses every `(path, text)` pair, keeping going past failures.
///
/// Returns the parsed files in input order together with the errors of
/// the files that were skipped.
pub fn parse_sources<'a, I>(
    inputs: I,
    classpath: &Arc<Classpath>,
) -> (Vec<Arc<SourceFile>>, Vec<SourceError>)
where
    I: IntoIterator<Item = (&'a Utf8Path, &'a str)>,
{
    let mut files = Vec::new();
    let mut errors = Vec::new();
    for (path, text) in inputs {
        match parse_source(path, text, classpath) {
            Ok(file) => files.push(Arc::new(file)),
            Err(err) => {
                warn!(%path, error = %err, "skipping source that does not parse");
                errors.push(err);
            }
        }
    }
    (files, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("src/Main.java", "class Main {}\n", Language::Java)]
    #[case("pom.xml", "<project/>\n", Language::Xml)]
    #[case("application.yaml", "a: 1\n", Language::Yaml)]
    #[case("application.properties", "a=1\n", Language::Properties)]
    fn dispatches_on_extension(#[case] path: &str, #[case] text: &str, #[case] expected: Language) {
        let file = parse_source(Utf8Path::new(path), text, &Arc::new(Classpath::jdk()))
            .expect("parses");
        assert_eq!(file.language(), expected);
        assert_eq!(file.print(), text);
    }

    #[test]
    fn collects_failures_without_stopping() {
        let inputs = [
            (Utf8Path::new("README.md"), "# hi\n"),
            (Utf8Path::new("a.properties"), "k=v\n"),
            (Utf8Path::new("b.properties"), "bad=\\u12\n"),
        ];
        let (files, errors) = parse_sources(inputs, &Arc::new(Classpath::jdk()));
        assert_eq!(files.len(), 1);
        assert!(matches!(errors.as_slice(), [SourceError::Unsupported { .. }, SourceError::Markup(_)]));
    }
}
