//! Error types for dxpm.
//!
//! [`DxpmError`] enumerates every failure mode the orchestrator can surface.
//! Functions return [`anyhow::Result`] and construct these variants with
//! `.into()`, so callers and tests recover the typed kind with
//! `err.downcast_ref::<DxpmError>()`.
//!
//! [`ErrorContext`] wraps an error with optional details and a suggestion for
//! display at the top of the CLI.

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;

/// Every failure the install/uninstall pipeline can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DxpmError {
    /// The external tool could not be found on `PATH`.
    #[error("{tool} CLI not found on PATH")]
    ToolNotFound {
        /// Binary name that was searched for
        tool: String,
    },

    /// No `sfdx-project.json` in the start directory or any parent.
    #[error("No sfdx-project.json found in {} or any parent directory", start.display())]
    ProjectNotFound {
        /// Directory the search started from
        start: PathBuf,
    },

    /// An alias did not match any known org or package version.
    #[error("Failed to locate {kind} with alias: {alias}")]
    ResolutionFailure {
        /// What was being resolved ("environment", "package", ...)
        kind: String,
        /// The user-supplied input
        alias: String,
    },

    /// The external tool exited non-zero, reported a failure status, or could
    /// not be spawned.
    #[error("`{command}` failed: {message}")]
    SubprocessFailure {
        /// Rendered command line
        command: String,
        /// Tool-reported message or I/O error
        message: String,
    },

    /// Reading, parsing or writing the project manifest failed.
    #[error("Failed to update {}: {message}", path.display())]
    ManifestIoFailure {
        /// Manifest path
        path: PathBuf,
        /// Underlying cause
        message: String,
    },

    /// A query expected to return exactly one record returned more.
    #[error("More than 1 {entity} with ID: {id} ({count} records returned)")]
    MultipleRecordsFailure {
        /// Queried entity (e.g. `SubscriberPackageVersion`)
        entity: String,
        /// Record id used in the query
        id: String,
        /// Number of records actually returned
        count: usize,
    },

    /// A package version reappeared on its own install path.
    #[error("Circular package dependency: {}", chain.join(" -> "))]
    CyclicDependency {
        /// Version ids from the outermost install to the repeated one
        chain: Vec<String>,
    },

    /// No org is flagged as the default dev hub.
    #[error("No default dev hub org found")]
    NoDefaultDevHub,

    /// The global configuration file could not be read or parsed.
    #[error("Invalid configuration in {}: {message}", path.display())]
    ConfigFailure {
        /// Config file path
        path: PathBuf,
        /// Underlying cause
        message: String,
    },
}

impl DxpmError {
    /// Shorthand for [`DxpmError::ResolutionFailure`].
    pub fn resolution(kind: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::ResolutionFailure {
            kind: kind.into(),
            alias: alias.into(),
        }
    }

    /// Shorthand for [`DxpmError::ManifestIoFailure`].
    pub fn manifest_io(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::ManifestIoFailure {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// User-facing wrapper around an error with optional guidance.
pub struct ErrorContext {
    /// The error being reported
    pub error: anyhow::Error,
    /// Extra detail shown under the message
    pub details: Option<String>,
    /// Actionable next step for the user
    pub suggestion: Option<String>,
}

impl ErrorContext {
    /// Wrap an error without details or suggestion.
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: error.into(),
            details: None,
            suggestion: None,
        }
    }

    /// Attach a suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colours.
    pub fn display(&self) {
        eprintln!("{} {}", "error:".red().bold(), self.error);
        for cause in self.error.chain().skip(1) {
            eprintln!("  {} {}", "caused by:".red(), cause);
        }
        if let Some(details) = &self.details {
            eprintln!("  {}", details.dimmed());
        }
        if let Some(suggestion) = &self.suggestion {
            eprintln!("{} {}", "hint:".yellow().bold(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(details) = &self.details {
            write!(f, "\n{details}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nhint: {suggestion}")?;
        }
        Ok(())
    }
}

/// Attach suggestions for the error kinds users can act on.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let typed = error.downcast_ref::<DxpmError>().cloned();
    let context = ErrorContext::new(error);

    match typed {
        Some(DxpmError::ToolNotFound { tool }) => context
            .with_suggestion(format!(
                "Install the Salesforce CLI and make sure `{tool}` is on your PATH, \
                 or set DXPM_SFDX_BIN"
            )),
        Some(DxpmError::ProjectNotFound { .. }) => context.with_suggestion(
            "Run dxpm from inside a Salesforce DX project (a directory containing sfdx-project.json)",
        ),
        Some(DxpmError::ResolutionFailure { kind, .. }) if kind == "environment" => context
            .with_suggestion("Use an org alias, an org id (00D...) or a username; `sfdx force:org:list` shows them"),
        Some(DxpmError::ResolutionFailure { kind, .. }) if kind == "package" => context
            .with_suggestion(
                "Use a package name, `name@version`, a package id (0Ho...) or a version id (04t...)",
            ),
        Some(DxpmError::CyclicDependency { .. }) => context
            .with_details("Package versions must form an acyclic dependency graph"),
        Some(DxpmError::NoDefaultDevHub) => context
            .with_suggestion("Authorize a dev hub with `sfdx force:auth:web:login -d`"),
        _ => context,
    }
}
