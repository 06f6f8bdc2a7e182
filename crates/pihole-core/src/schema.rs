//! Schema, resource data and diagnostics
//!
//! These types describe what a provider and its resources accept, carry the
//! attribute values handed to resource handlers, and report handler failures.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Attribute value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Bool,
    Int,
}

/// Schema of a single attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub description: String,
    #[serde(rename = "type")]
    pub kind: AttributeType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub optional: bool,
    /// Changing this attribute forces delete + create
    #[serde(default)]
    pub force_new: bool,
    /// Value must never be shown
    #[serde(default)]
    pub sensitive: bool,
    /// Values are compared after domain normalization
    #[serde(default)]
    pub case_insensitive: bool,
    /// Environment variable used when the attribute is not set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_default: Option<String>,
}

impl Attribute {
    fn string() -> Self {
        Self {
            description: String::new(),
            kind: AttributeType::String,
            required: false,
            optional: false,
            force_new: false,
            sensitive: false,
            case_insensitive: false,
            env_default: None,
        }
    }

    pub fn required_string() -> Self {
        Self {
            required: true,
            ..Self::string()
        }
    }

    pub fn optional_string() -> Self {
        Self {
            optional: true,
            ..Self::string()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn with_env_default(mut self, var: impl Into<String>) -> Self {
        self.env_default = Some(var.into());
        self
    }
}

/// Schema of a resource (or of the provider configuration block)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceSchema {
    pub description: String,
    pub attributes: BTreeMap<String, Attribute>,
    /// Whether the resource supports import by ID
    #[serde(default)]
    pub importable: bool,
}

impl ResourceSchema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn importable(mut self) -> Self {
        self.importable = true;
        self
    }

    /// Names of the attributes that force replacement, sorted
    pub fn force_new_attributes(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(_, attr)| attr.force_new)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Check resource data against this schema
    ///
    /// Required attributes must be present, and every known attribute must
    /// carry a value of its declared type. Unknown attributes are errors.
    pub fn validate(&self, data: &ResourceData) -> Diagnostics {
        let mut diags = Diagnostics::new();

        for (name, attr) in &self.attributes {
            match data.attributes.get(name) {
                None | Some(Value::Null) => {
                    if attr.required {
                        diags.push(Diagnostic::error(
                            "Missing required argument",
                            format!("The argument \"{}\" is required", name),
                        ));
                    }
                }
                Some(value) => {
                    let type_ok = match attr.kind {
                        AttributeType::String => value.is_string(),
                        AttributeType::Bool => value.is_boolean(),
                        AttributeType::Int => value.is_i64() || value.is_u64(),
                    };
                    if !type_ok {
                        diags.push(Diagnostic::error(
                            "Incorrect attribute value type",
                            format!("Attribute \"{}\" must be of type {:?}", name, attr.kind),
                        ));
                    }
                }
            }
        }

        for name in data.attributes.keys() {
            if !self.attributes.contains_key(name) {
                diags.push(Diagnostic::error(
                    "Unsupported argument",
                    format!("An argument named \"{}\" is not expected here", name),
                ));
            }
        }

        diags
    }
}

/// Full schema of a provider: its configuration block and its resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSchema {
    pub provider: ResourceSchema,
    pub resources: BTreeMap<String, ResourceSchema>,
}

/// Attribute values of one resource instance, plus its ID
///
/// An instance without an ID does not exist: handlers clear the ID to signal
/// that the remote object is gone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceData {
    pub id: Option<String>,
    pub attributes: BTreeMap<String, Value>,
}

impl ResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resource data holding only an ID (as after import)
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Get a string attribute
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Whether the remote object is gone
    pub fn is_gone(&self) -> bool {
        self.id.as_deref().is_none_or(str::is_empty)
    }
}

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic reported by a handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        if self.detail.is_empty() {
            write!(f, "{}: {}", level, self.summary)
        } else {
            write!(f, "{}: {}: {}", level, self.summary, self.detail)
        }
    }
}

/// Diagnostics returned by resource handlers
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single error diagnostic from a message
    pub fn error(summary: impl Into<String>) -> Self {
        Self(vec![Diagnostic::error(summary, "")])
    }

    /// A single error diagnostic from an error
    pub fn from_err(err: &crate::Error) -> Self {
        Self(vec![Diagnostic::error(err.to_string(), "")])
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.0.push(diag);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Collapse error diagnostics into a provider error
    ///
    /// Warnings are logged and dropped.
    pub fn into_result(self, resource_type: &str) -> crate::Result<()> {
        for warning in self.0.iter().filter(|d| d.severity == Severity::Warning) {
            tracing::warn!("{}: {}", resource_type, warning);
        }

        let errors: Vec<String> = self
            .0
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(ToString::to_string)
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(crate::Error::provider(resource_type, errors.join("; ")))
        }
    }
}

impl From<crate::Error> for Diagnostics {
    fn from(err: crate::Error) -> Self {
        Self::from_err(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_schema() -> ResourceSchema {
        ResourceSchema::new("test")
            .with_attribute("domain", Attribute::required_string().force_new())
            .with_attribute("ip", Attribute::required_string().force_new())
            .with_attribute("comment", Attribute::optional_string())
    }

    #[test]
    fn test_validate_accepts_complete_data() {
        let data = ResourceData::new().with("domain", "nas.lan").with("ip", "10.0.0.2");
        assert!(record_schema().validate(&data).is_empty());
    }

    #[test]
    fn test_validate_reports_missing_and_unknown() {
        let data = ResourceData::new().with("domain", "nas.lan").with("ttl", 60);
        let diags = record_schema().validate(&data);
        assert!(diags.has_error());
        assert_eq!(diags.iter().count(), 2);
    }

    #[test]
    fn test_validate_reports_wrong_type() {
        let data = ResourceData::new().with("domain", 42).with("ip", "10.0.0.2");
        let diags = record_schema().validate(&data);
        assert!(diags.has_error());
    }

    #[test]
    fn test_force_new_attributes() {
        assert_eq!(record_schema().force_new_attributes(), vec!["domain", "ip"]);
    }

    #[test]
    fn test_resource_data_gone() {
        let mut data = ResourceData::with_id("nas.lan_10.0.0.2");
        assert!(!data.is_gone());
        data.clear_id();
        assert!(data.is_gone());
        data.set_id("");
        assert!(data.is_gone());
    }

    #[test]
    fn test_into_result_keeps_only_errors() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::warning("deprecated", ""));
        assert!(diags.clone().into_result("pihole_dns_record").is_ok());

        diags.push(Diagnostic::error("boom", "detail"));
        let err = diags.into_result("pihole_dns_record").unwrap_err();
        assert!(err.to_string().contains("boom: detail"));
    }
}
