//! Validation report types for structured error reporting.
//!
//! Reports can be printed for people or serialized to JSON for tools.

use std::fmt;

use serde::Serialize;

/// The result of validating a dataset or transformation.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    /// All issues found during validation.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Returns true if there are no issues at all, warnings included.
    pub fn is_ok_strict(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues carrying `code`.
    pub fn with_code(&self, code: IssueCode) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "Validation passed: no issues found");
        }

        writeln!(
            f,
            "Validation completed with {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// A single validation issue (error or warning).
#[derive(Clone, Debug, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,

    /// A stable code for the issue type.
    pub code: IssueCode,

    pub message: String,

    /// Where in the document the issue occurred.
    pub context: IssueContext,
}

impl ValidationIssue {
    pub fn new(
        severity: Severity,
        code: IssueCode,
        message: impl Into<String>,
        context: IssueContext,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            context,
        }
    }

    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Error, code, message, context)
    }

    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Warning, code, message, context)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {:?} in {}: {}",
            severity, self.code, self.context, self.message
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Suspicious but decodable metadata.
    Warning,
    /// Metadata that cannot be interpreted consistently.
    Error,
}

/// A stable code identifying the type of validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IssueCode {
    // Coordinate system issues
    /// One entity declares the same frame name twice.
    DuplicateCoordinateSystem,
    /// Two entities declare the same frame name with different axes.
    DuplicateCoordinateSystemAcrossDataset,

    // Frame references
    /// A transformation's `input` names no declared frame.
    UnknownInputFrame,
    /// A transformation's `output` names no declared frame.
    UnknownOutputFrame,

    // Sequence structure
    /// A step's `output` is not the next step's `input`.
    BrokenSequenceChain,
    /// A sequence's `input`/`output` differ from its first/last step.
    SequenceEndpointMismatch,
    /// A sequence with no steps.
    EmptySequence,
    /// A transformation whose payload key is absent or `null`.
    MissingPayload,

    // Payloads
    /// A payload's length disagrees with its input frame's axis count.
    PayloadDimensionMismatch,
    /// Paired point lists have different lengths.
    PointCountMismatch,
}

/// Where a validation issue occurred.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum IssueContext {
    /// The document as a whole.
    Dataset,
    /// A record, e.g. `regions[0].tomograms[1]`.
    Entity(String),
    /// A transformation, e.g. `regions[0].tomograms[1].coordinate_transformations[0]`.
    Transformation(String),
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Dataset => write!(f, "dataset"),
            IssueContext::Entity(path) => write!(f, "{}", path),
            IssueContext::Transformation(path) => write!(f, "transformation {}", path),
        }
    }
}
