use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all stepwise operations.
#[derive(Debug, Error, Diagnostic)]
pub enum StepwiseError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A version string does not have the `namespace-1.2.3` shape.
    #[error("Malformed version '{input}'")]
    #[diagnostic(help("Versions are written as <namespace>-<digits>[.<digits>...], e.g. scout-1.0.2"))]
    MalformedVersion { input: String },

    /// The same namespace was configured more than once.
    #[error("Namespace '{namespace}' is configured more than once")]
    DuplicateNamespace { namespace: String },

    /// A unit, or one of its dependencies, names a namespace that is not configured.
    #[error("Unit {unit} references unknown namespace '{namespace}'")]
    #[diagnostic(help("Add the namespace to the configured namespace list"))]
    UnknownNamespace { unit: String, namespace: String },

    /// Two units share the same version.
    #[error("Version {version} is declared by more than one unit")]
    DuplicateUnit { version: String },

    /// A unit declares two dependencies on the same namespace.
    #[error("Unit {unit} declares more than one dependency on namespace '{namespace}'")]
    DuplicateDependencyNamespace { unit: String, namespace: String },

    /// A declared dependency does not match any known unit.
    #[error("Unit {unit} depends on {dependency}, which does not exist")]
    UnresolvableDependency { unit: String, dependency: String },

    /// A query state lists the same namespace twice.
    #[error("Namespace '{namespace}' appears more than once in the query")]
    DuplicateNamespaceInQuery { namespace: String },

    /// Ordering could not make progress.
    #[error("Dependency cycle detected between: {}", units.join(", "))]
    DependencyCycle { units: Vec<String> },

    /// Required units are newer than the starting state provides.
    #[error("Unsatisfied dependencies: {}", versions.join(", "))]
    #[diagnostic(help("Upgrade the starting state past these versions first"))]
    Unsatisfied { versions: Vec<String> },

    /// Invalid or malformed manifest (e.g. Stepwise.toml).
    #[error("Manifest error: {message}")]
    #[diagnostic(help("Check your Stepwise.toml for syntax errors"))]
    Manifest { message: String },

    /// Global configuration could not be read or parsed.
    #[error("Config error: {message}")]
    Config { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for results carrying a [`StepwiseError`].
pub type StepwiseResult<T> = Result<T, StepwiseError>;
