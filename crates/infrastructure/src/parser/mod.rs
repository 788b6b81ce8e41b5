//! Suite file parser.
//!
//! Reads `WafTest` YAML documents, checks them against the schema and
//! turns them into domain [`TestSuite`]s. Schema problems are collected and
//! reported together so one pass fixes a file.

mod document;
mod duration;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use wafguard_domain::{ExpectationSpec, HttpMethod, RequestSpec, Target, TestCase, TestSuite};

use self::document::{SuiteDocument, TestDocument, TimeoutValue};
pub use self::duration::{DurationError, parse_duration};

/// The only accepted `kind`.
pub const KIND: &str = "WafTest";

/// Errors that can occur while loading suite files.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A file or directory could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed YAML or has mistyped fields.
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document is valid YAML but breaks the schema.
    #[error("validation failed: {}", violations.join("; "))]
    Schema {
        /// Every violation found, in document order.
        violations: Vec<String>,
    },

    /// Wraps an error with the file it came from.
    #[error("failed to parse {}: {source}", path.display())]
    InFile {
        /// The offending file.
        path: PathBuf,
        /// What went wrong.
        #[source]
        source: Box<Self>,
    },
}

impl ParseError {
    fn in_file(self, path: &Path) -> Self {
        Self::InFile {
            path: path.to_path_buf(),
            source: Box::new(self),
        }
    }
}

/// Loads suite definitions from YAML text, files and directories.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuiteParser;

impl SuiteParser {
    /// Creates a new parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parses and validates one YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Yaml`] for malformed documents and
    /// [`ParseError::Schema`] listing every schema violation.
    pub fn parse_yaml(&self, yaml: &str) -> Result<TestSuite, ParseError> {
        let document: SuiteDocument = serde_yaml::from_str(yaml)?;
        build_suite(document)
    }

    /// Reads and parses one suite file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub async fn parse_file(&self, path: impl AsRef<Path>) -> Result<TestSuite, ParseError> {
        let path = path.as_ref();
        let yaml = tokio::fs::read_to_string(path).await.map_err(io_error(path))?;
        self.parse_yaml(&yaml).map_err(|e| e.in_file(path))
    }

    /// Parses a single file, or every `.yaml`/`.yml` file below a
    /// directory in sorted path order.
    ///
    /// # Errors
    ///
    /// Returns the first read or parse error encountered.
    pub async fn parse_path(&self, path: impl AsRef<Path>) -> Result<Vec<TestSuite>, ParseError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await.map_err(io_error(path))?;

        if !metadata.is_dir() {
            return Ok(vec![self.parse_file(path).await?]);
        }

        let mut suites = Vec::new();
        for file in collect_suite_files(path).await? {
            suites.push(self.parse_file(&file).await?);
        }
        Ok(suites)
    }
}

/// Returns true for paths with a `.yaml` or `.yml` extension.
fn is_suite_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ParseError + use<> {
    let path = path.to_path_buf();
    move |source| ParseError::Io { path, source }
}

async fn collect_suite_files(root: &Path) -> Result<Vec<PathBuf>, ParseError> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await.map_err(io_error(&dir))?;
        while let Some(entry) = entries.next_entry().await.map_err(io_error(&dir))? {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(io_error(&path))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if is_suite_file(&path) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn build_suite(document: SuiteDocument) -> Result<TestSuite, ParseError> {
    let mut violations = Vec::new();

    if document.api_version.as_deref().is_none_or(str::is_empty) {
        violations.push("apiVersion is required".to_string());
    }
    match document.kind.as_deref() {
        None | Some("") => violations.push("kind is required".to_string()),
        Some(KIND) => {}
        Some(other) => violations.push(format!("kind must be '{KIND}', got '{other}'")),
    }

    let name = required(document.metadata.name, "metadata.name", &mut violations);
    let target = build_target(document.spec.target, &mut violations);

    if document.spec.tests.is_empty() {
        violations.push("spec.tests must contain at least one test".to_string());
    }
    let tests: Vec<TestCase> = document
        .spec
        .tests
        .into_iter()
        .enumerate()
        .filter_map(|(index, test)| build_test(index, test, &mut violations))
        .collect();

    if !violations.is_empty() {
        return Err(ParseError::Schema { violations });
    }

    Ok(TestSuite {
        name,
        description: document.metadata.description.filter(|d| !d.is_empty()),
        target,
        tests,
    })
}

fn required(value: Option<String>, field: &str, violations: &mut Vec<String>) -> String {
    match value {
        Some(value) if !value.trim().is_empty() => value,
        _ => {
            violations.push(format!("{field} is required"));
            String::new()
        }
    }
}

fn build_target(target: document::TargetDocument, violations: &mut Vec<String>) -> Target {
    let base_url = required(target.base_url, "spec.target.baseUrl", violations);
    if !base_url.is_empty() {
        match url::Url::parse(&base_url) {
            Ok(url) if url.has_host() => {}
            Ok(_) => violations.push(format!(
                "spec.target.baseUrl must be an absolute URL with a host, got '{base_url}'"
            )),
            Err(e) => violations.push(format!(
                "spec.target.baseUrl must be an absolute URL, got '{base_url}': {e}"
            )),
        }
    }

    let timeout = match target.timeout {
        None => None,
        Some(TimeoutValue::Nanos(nanos)) => Some(Duration::from_nanos(nanos)),
        Some(TimeoutValue::Text(text)) => match parse_duration(&text) {
            Ok(timeout) => Some(timeout),
            Err(e) => {
                violations.push(format!("spec.target.timeout: {e}"));
                None
            }
        },
    };

    Target { base_url, timeout }
}

fn build_test(index: usize, test: TestDocument, violations: &mut Vec<String>) -> Option<TestCase> {
    let before = violations.len();
    let prefix = format!("spec.tests[{index}]");

    let name = required(test.name, &format!("{prefix}.name"), violations);
    let method = match test.request.method.as_deref() {
        None | Some("") => {
            violations.push(format!("{prefix}.request.method is required"));
            None
        }
        Some(raw) => match HttpMethod::from_str(raw) {
            Ok(method) => Some(method),
            Err(_) => {
                violations.push(format!(
                    "{prefix}.request.method must be one of {}, got '{raw}'",
                    HttpMethod::NAMES.join(", ")
                ));
                None
            }
        },
    };
    let path = required(test.request.path, &format!("{prefix}.request.path"), violations);
    if test.expected.status.is_empty() {
        violations.push(format!(
            "{prefix}.expected.status must list at least one status code"
        ));
    }

    if violations.len() > before {
        return None;
    }

    let request = RequestSpec {
        method: method?,
        path,
        headers: test.request.headers,
        body: test.request.body,
    };
    let expected = ExpectationSpec {
        status: test.expected.status,
        headers: test.expected.headers,
        body: test.expected.body,
    };
    Some(TestCase::new(name, request, expected))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use pretty_assertions::assert_eq;
    use wafguard_domain::BodyExpectation;

    use super::*;

    const VALID: &str = r#"
apiVersion: waf-test/v1
kind: WafTest
metadata:
  name: sql-injection
  description: Blocks classic payloads
spec:
  target:
    baseUrl: https://example.com
    timeout: 10s
  tests:
    - name: union select is blocked
      request:
        method: GET
        path: /search?q=1%20UNION%20SELECT
        headers:
          User-Agent: wafguard
      expected:
        status: [403]
        headers:
          Server: cloudflare
        body:
          contains: [blocked]
          not_contains: [mysql]
    - name: login form accepts posts
      request:
        method: POST
        path: /login
        body: "user=admin"
      expected:
        status: [200, 302]
        body:
          regex: "^<html"
"#;

    fn violations(yaml: &str) -> Vec<String> {
        match SuiteParser::new().parse_yaml(yaml) {
            Err(ParseError::Schema { violations }) => violations,
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_valid_document() {
        let suite = SuiteParser::new().parse_yaml(VALID).unwrap();

        assert_eq!(suite.name, "sql-injection");
        assert_eq!(suite.description.as_deref(), Some("Blocks classic payloads"));
        assert_eq!(suite.target.base_url, "https://example.com");
        assert_eq!(suite.target.timeout, Some(Duration::from_secs(10)));
        assert_eq!(suite.tests.len(), 2);

        let first = &suite.tests[0];
        assert_eq!(first.request.method, HttpMethod::Get);
        assert_eq!(first.request.headers.get("User-Agent").map(String::as_str), Some("wafguard"));
        assert_eq!(first.expected.status, vec![403]);
        assert_eq!(
            first.expected.body,
            Some(BodyExpectation::default().containing("blocked").not_containing("mysql"))
        );

        let second = &suite.tests[1];
        assert_eq!(second.request.method, HttpMethod::Post);
        assert_eq!(second.request.body.as_deref(), Some("user=admin"));
        assert_eq!(second.expected.body.as_ref().and_then(|b| b.regex.as_deref()), Some("^<html"));
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let found = violations("metadata: {}\nspec: {}\n");

        assert_eq!(
            found,
            vec![
                "apiVersion is required",
                "kind is required",
                "metadata.name is required",
                "spec.target.baseUrl is required",
                "spec.tests must contain at least one test",
            ]
        );
    }

    #[test]
    fn test_any_api_version_is_accepted() {
        let yaml = VALID.replace("apiVersion: waf-test/v1", "apiVersion: waf-test/v2");
        let suite = SuiteParser::new().parse_yaml(&yaml).unwrap();
        assert_eq!(suite.name, "sql-injection");

        let yaml = VALID.replace("apiVersion: waf-test/v1", "apiVersion: \"\"");
        assert_eq!(violations(&yaml), vec!["apiVersion is required"]);
    }

    #[test]
    fn test_rejects_wrong_kind() {
        let yaml = VALID.replace("kind: WafTest", "kind: InvalidKind");
        assert_eq!(violations(&yaml), vec!["kind must be 'WafTest', got 'InvalidKind'"]);
    }

    #[test]
    fn test_rejects_bad_test_entries() {
        let yaml = r"
apiVersion: waf-test/v1
kind: WafTest
metadata:
  name: broken
spec:
  target:
    baseUrl: not-a-url
    timeout: soon
  tests:
    - request:
        method: TRACE
        path: /
      expected:
        status: []
";
        let found = violations(yaml);

        assert_eq!(found.len(), 5, "{found:#?}");
        assert!(found[0].starts_with("spec.target.baseUrl must be an absolute URL"));
        assert!(found[1].starts_with("spec.target.timeout: invalid duration 'soon'"));
        assert_eq!(found[2], "spec.tests[0].name is required");
        assert_eq!(
            found[3],
            "spec.tests[0].request.method must be one of GET, POST, PUT, DELETE, PATCH, HEAD, OPTIONS, got 'TRACE'"
        );
        assert_eq!(found[4], "spec.tests[0].expected.status must list at least one status code");
    }

    #[test]
    fn test_malformed_yaml() {
        let result = SuiteParser::new().parse_yaml("apiVersion: [unclosed");
        assert!(matches!(result, Err(ParseError::Yaml(_))));
    }

    #[test]
    fn test_numeric_timeout_is_nanoseconds() {
        let yaml = VALID.replace("timeout: 10s", "timeout: 2000000000");
        let suite = SuiteParser::new().parse_yaml(&yaml).unwrap();
        assert_eq!(suite.target.timeout, Some(Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn test_parse_path_walks_directories_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        tokio::fs::create_dir(&nested).await.unwrap();

        let write = |path: PathBuf, name: &str| {
            let yaml = VALID.replace("name: sql-injection", &format!("name: {name}"));
            async move { tokio::fs::write(path, yaml).await.unwrap() }
        };
        write(dir.path().join("b.yaml"), "second").await;
        write(dir.path().join("a.yml"), "first").await;
        write(nested.join("c.yaml"), "third").await;
        tokio::fs::write(dir.path().join("notes.txt"), "ignored").await.unwrap();

        let suites = SuiteParser::new().parse_path(dir.path()).await.unwrap();
        let names: Vec<&str> = suites.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_parse_file_names_the_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        tokio::fs::write(&path, "kind: WafTest\n").await.unwrap();

        let err = SuiteParser::new().parse_path(&path).await.unwrap_err();

        assert!(matches!(err, ParseError::InFile { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[tokio::test]
    async fn test_missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SuiteParser::new()
            .parse_path(dir.path().join("absent.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
