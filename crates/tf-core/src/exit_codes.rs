//! Exit codes for the tf-core CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0-9: Operational outcomes
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors (bugs, should be reported)

/// Exit codes for tf-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // Operational outcomes (0-9)
    /// Success: rows visible, bulk run fully succeeded.
    Clean = 0,

    /// The query and filters matched no rows.
    NoResults = 1,

    /// Bulk run finished with some failed items.
    PartialFail = 3,

    // User / environment errors (10-19)
    /// Invalid arguments.
    ArgsError = 10,

    /// Config or translations invalid or unreadable.
    ConfigError = 11,

    /// The document lacks an element or row the command needs.
    DocumentError = 12,

    // Internal errors (20-29)
    InternalError = 20,

    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Codes 0-9 communicate outcome, not failure.
    pub fn is_operational(self) -> bool {
        (self as i32) < 10
    }

    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Name used in JSON output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::NoResults => "OK_NO_RESULTS",
            ExitCode::PartialFail => "ERR_PARTIAL",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::DocumentError => "ERR_DOCUMENT",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

impl From<&tf_common::Error> for ExitCode {
    fn from(err: &tf_common::Error) -> Self {
        use tf_common::ErrorCategory;
        match err.category() {
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Document => ExitCode::DocumentError,
            ErrorCategory::Action => ExitCode::PartialFail,
            ErrorCategory::Io => ExitCode::IoError,
        }
    }
}
