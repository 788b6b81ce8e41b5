//! On-disk shape of a suite file.
//!
//! Every field is optional here so schema problems can be collected and
//! reported together instead of failing on the first missing key.

use std::collections::BTreeMap;

use serde::Deserialize;
use wafguard_domain::BodyExpectation;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SuiteDocument {
    pub api_version: Option<String>,
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: MetadataDocument,
    #[serde(default)]
    pub spec: SpecDocument,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct MetadataDocument {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct SpecDocument {
    #[serde(default)]
    pub target: TargetDocument,
    #[serde(default)]
    pub tests: Vec<TestDocument>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TargetDocument {
    pub base_url: Option<String>,
    pub timeout: Option<TimeoutValue>,
}

/// A timeout written either as a duration string or as bare nanoseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum TimeoutValue {
    Nanos(u64),
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct TestDocument {
    pub name: Option<String>,
    #[serde(default)]
    pub request: RequestDocument,
    #[serde(default)]
    pub expected: ExpectedDocument,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RequestDocument {
    pub method: Option<String>,
    pub path: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ExpectedDocument {
    #[serde(default)]
    pub status: Vec<u16>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub body: Option<BodyExpectation>,
}
