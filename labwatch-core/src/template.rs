//! Job-description templates
//!
//! A template is operator-authored text with `##NAME##` placeholders.
//! Rendering replaces every placeholder that has a substitution and leaves
//! everything else verbatim, including `##...##` tokens nobody asked for.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"##(\w+)##").expect("constant regex pattern is valid"));

/// Substitution keys every run supplies
pub const KEY_RELEASE: &str = "KVER";
pub const KEY_ARTIFACT_URL: &str = "KPKG_URL";
pub const KEY_CORRELATION_ID: &str = "UID";

/// Errors raised while loading a template
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read job template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An immutable job-description template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTemplate {
    /// Lines including their terminators, so rendering preserves the layout
    lines: Vec<String>,
}

impl JobTemplate {
    /// Creates a template from in-memory text
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.split_inclusive('\n').map(str::to_string).collect(),
        }
    }

    /// Loads a template from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(&text))
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Fills placeholders line by line
    ///
    /// Each match is replaced in a single pass, so a substituted value that
    /// itself looks like a placeholder is not expanded again.
    pub fn render(&self, substitutions: &Substitutions) -> RenderedJob {
        let text = self
            .lines
            .iter()
            .map(|line| {
                PLACEHOLDER
                    .replace_all(line, |caps: &Captures| {
                        match substitutions.get(&caps[1]) {
                            Some(value) => value.to_string(),
                            None => caps[0].to_string(),
                        }
                    })
                    .into_owned()
            })
            .collect();

        RenderedJob(text)
    }
}

/// Placeholder name to replacement value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions(BTreeMap<String, String>);

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the standard map for a published build
    ///
    /// The correlation id is the artifact URL's final path segment.
    pub fn for_build(artifact_url: &str, release: &str) -> Self {
        Self::new()
            .with(KEY_RELEASE, release)
            .with(KEY_ARTIFACT_URL, artifact_url)
            .with(KEY_CORRELATION_ID, correlation_id(artifact_url))
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Trailing path segment of an artifact URL
///
/// Trailing slashes are ignored, so `http://x/build/123/` yields `123`.
/// This deliberately departs from a plain split on `/`, which would give an
/// empty id for such URLs.
pub fn correlation_id(artifact_url: &str) -> &str {
    artifact_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// A template with its placeholders filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedJob(String);

impl RenderedJob {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_render_scenario_line() {
        let template = JobTemplate::new("recipe for ##KVER## at ##KPKG_URL## [##UID##]");
        let subs = Substitutions::new()
            .with("KVER", "5.10.0")
            .with("KPKG_URL", "http://x/build/123")
            .with("UID", "123");

        let rendered = template.render(&subs);
        assert_eq!(
            rendered.as_str(),
            "recipe for 5.10.0 at http://x/build/123 [123]"
        );
    }

    #[test]
    fn test_unknown_placeholder_left_verbatim() {
        let template = JobTemplate::new("<param value=\"##UNKNOWN##\"/> ##KVER##\n");
        let subs = Substitutions::new().with("KVER", "6.1.0");

        assert_eq!(
            template.render(&subs).as_str(),
            "<param value=\"##UNKNOWN##\"/> 6.1.0\n"
        );
    }

    #[test]
    fn test_render_without_placeholders_is_identity() {
        let text = "<job>\n  <whiteboard>plain ## text</whiteboard>\n</job>\n";
        let template = JobTemplate::new(text);

        assert_eq!(template.render(&Substitutions::new()).as_str(), text);
        assert_eq!(
            template.render(&Substitutions::for_build("http://a/b", "1")).as_str(),
            text
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let template = JobTemplate::new("##KVER## ##KVER##\n##UID##\n");
        let subs = Substitutions::for_build("http://x/build/123", "5.10.0");

        let first = template.render(&subs);
        let second = template.render(&subs);
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "5.10.0 5.10.0\n123\n");
    }

    #[test]
    fn test_substituted_value_not_expanded_again() {
        let template = JobTemplate::new("##A##");
        let subs = Substitutions::new().with("A", "##B##").with("B", "nope");

        assert_eq!(template.render(&subs).as_str(), "##B##");
    }

    #[test]
    fn test_for_build_derives_correlation_id() {
        let subs = Substitutions::for_build("http://x/build/kernel-123.tar.gz", "5.10.0");
        assert_eq!(subs.get(KEY_CORRELATION_ID), Some("kernel-123.tar.gz"));
        assert_eq!(subs.get(KEY_RELEASE), Some("5.10.0"));
        assert_eq!(
            subs.get(KEY_ARTIFACT_URL),
            Some("http://x/build/kernel-123.tar.gz")
        );
    }

    #[test]
    fn test_correlation_id_edge_cases() {
        assert_eq!(correlation_id("http://x/build/123/"), "123");
        assert_eq!(correlation_id("http://x/build/123//"), "123");
        assert_eq!(correlation_id("artifact"), "artifact");
        assert_eq!(correlation_id(""), "");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "<job>##KVER##</job>").unwrap();

        let template = JobTemplate::from_file(file.path()).unwrap();
        assert_eq!(template.lines().count(), 1);
        assert_eq!(
            template
                .render(&Substitutions::new().with("KVER", "4.18"))
                .as_str(),
            "<job>4.18</job>\n"
        );
    }

    #[test]
    fn test_from_missing_file() {
        let err = JobTemplate::from_file("/nonexistent/template.xml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/template.xml"));
    }
}
