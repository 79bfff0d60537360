//! Validation report with collect-then-fail-once semantics.
//!
//! Readers add one [`Violation`] per broken rule while they work through a
//! request and call [`ValidationReport::process`] exactly once at the end.

use std::fmt;

use serde::Serialize;

use crate::error::CodecResult;
use crate::namespaces::OWS_11;
use crate::xml::{NamespaceContext, XmlElement};

/// OWS exception codes used for parameter validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExceptionCode {
    MissingParameterValue,
    InvalidParameterValue,
    OptionNotSupported,
}

impl ExceptionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExceptionCode::MissingParameterValue => "MissingParameterValue",
            ExceptionCode::InvalidParameterValue => "InvalidParameterValue",
            ExceptionCode::OptionNotSupported => "OptionNotSupported",
        }
    }
}

impl fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single broken validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub code: ExceptionCode,
    /// Name of the offending parameter.
    pub locator: String,
    pub message: String,
}

impl Violation {
    /// The mandatory parameter `locator` is absent or empty.
    pub fn missing(locator: impl Into<String>) -> Self {
        let locator = locator.into();
        Self {
            code: ExceptionCode::MissingParameterValue,
            message: format!("The value for the mandatory parameter '{}' is missing", locator),
            locator,
        }
    }

    /// The parameter `locator` is present but its value cannot be used.
    pub fn invalid(locator: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ExceptionCode::InvalidParameterValue,
            locator: locator.into(),
            message: message.into(),
        }
    }

    /// The parameter `locator` asks for something this binding cannot do.
    pub fn unsupported(locator: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ExceptionCode::OptionNotSupported,
            locator: locator.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.code, self.locator, self.message)
    }
}

/// Mutable accumulator of violations for one request.
#[derive(Debug, Default)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Add a missing-parameter violation unless `present` holds.
    pub fn require(&mut self, present: bool, locator: &str) {
        if !present {
            self.add(Violation::missing(locator));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Flush the report. No-op when nothing was added, otherwise one failure
    /// carrying every violation in insertion order.
    pub fn process(self) -> Result<(), ValidationFailure> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            tracing::debug!(violations = self.violations.len(), "Request failed validation");
            Err(ValidationFailure {
                violations: self.violations,
            })
        }
    }
}

/// Aggregated validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    violations: Vec<Violation>,
}

impl ValidationFailure {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Locators of every violation, in rule order.
    pub fn locators(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.locator.as_str()).collect()
    }

    /// Render as an OWS 1.1 ExceptionReport with one Exception per violation.
    pub fn to_exception_report(&self, version: &str) -> CodecResult<String> {
        let mut ns = NamespaceContext::new();
        ns.register("ows", OWS_11);

        let mut report = XmlElement::new("ows:ExceptionReport");
        report.set_attribute("version", version);
        for violation in &self.violations {
            let exception = report.add_path("ows:Exception");
            exception.set_attribute("exceptionCode", violation.code.as_str());
            exception.set_attribute("locator", violation.locator.as_str());
            exception.add_text("ows:ExceptionText", violation.message.as_str());
        }
        report.to_xml_string(&ns)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request validation failed with {} violation(s)", self.violations.len())?;
        for violation in &self.violations {
            write!(f, "; {}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_empty_report_is_noop() {
        let report = ValidationReport::new();
        assert!(report.process().is_ok());
    }

    #[test]
    fn test_process_carries_every_violation_in_order() {
        let mut report = ValidationReport::new();
        report.add(Violation::missing("offering"));
        report.require(false, "observedProperty");
        report.require(true, "service");
        report.add(Violation::invalid("temporalFilter", "bad period"));

        let failure = report.process().unwrap_err();
        assert_eq!(failure.violations().len(), 3);
        assert_eq!(
            failure.locators(),
            vec!["offering", "observedProperty", "temporalFilter"]
        );
        assert_eq!(failure.violations()[2].code, ExceptionCode::InvalidParameterValue);
    }

    #[test]
    fn test_display_enumerates_rules() {
        let mut report = ValidationReport::new();
        report.add(Violation::missing("procedure"));
        report.add(Violation::missing("procedureDescriptionFormat"));
        let display = report.process().unwrap_err().to_string();
        assert!(display.contains("2 violation(s)"));
        assert!(display.contains("[procedure]"));
        assert!(display.contains("[procedureDescriptionFormat]"));
    }

    #[test]
    fn test_exception_report_has_one_exception_per_violation() {
        let mut report = ValidationReport::new();
        report.add(Violation::missing("offering"));
        report.add(Violation::unsupported("responseFormat", "text/csv is not offered"));
        let xml = report
            .process()
            .unwrap_err()
            .to_exception_report("2.0.0")
            .unwrap();

        let parsed = XmlElement::parse(&xml).unwrap();
        assert_eq!(parsed.local_name(), "ExceptionReport");
        let exceptions = parsed.children_at("ows:Exception");
        assert_eq!(exceptions.len(), 2);
        assert_eq!(exceptions[0].attribute("exceptionCode"), Some("MissingParameterValue"));
        assert_eq!(exceptions[1].attribute("locator"), Some("responseFormat"));
        assert_eq!(
            exceptions[1].text_at("ows:ExceptionText"),
            Some("text/csv is not offered")
        );
    }
}
