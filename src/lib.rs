//! # DoxyCheck
//!
//! `doxycheck` reads C and C++ sources, finds their Doxygen-style documentation
//! comments and works out which declaration or member each comment documents.
//! The result is a documentation model per file, plus a checker that reports
//! declarations, members and comments that are missing or misplaced.
//!
//! ## Features
//!
//! - **Comment Lexing**: Block (`/** */`, `/*! */`) and line (`///`, `//!`) doc comments,
//!   leading or trailing (`///<`), with byte-accurate spans
//! - **Brief and Detail**: `@brief`, `\brief` and `@details` tags, with the blank-line
//!   paragraph rule separating brief from detailed descriptions
//! - **Declaration Scanning**: `#define`, `typedef`, `enum`, `union`, `class`, `struct` and
//!   function declarations, including enumerator values and aggregate fields
//! - **Positional Association**: Comments bind to the declaration or member they are
//!   adjacent to, never across intervening code
//!
//! ## Quick Start
//!
//! ```rust
//! use doxycheck::{Result, parse_source};
//!
//! fn main() -> Result<()> {
//!     let model = parse_source(
//!         "/** @brief Seasons of the year */\nenum seasons {\n  spring = 3, ///< Spring\n  summer\n};\n",
//!     )?;
//!
//!     let seasons = model.get("seasons").unwrap();
//!     assert_eq!(seasons.doc.as_ref().unwrap().brief, "Seasons of the year");
//!     assert_eq!(seasons.members[1].member.value, Some(4));
//!     assert!(seasons.members[1].doc.is_none());
//!     Ok(())
//! }
//! ```
//!
//! ## Checking a Source Tree
//!
//! ```rust
//! use doxycheck::{Check, CheckConfig, DoxyCheck, Result};
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<()> {
//! let report = DoxyCheck::new().check(&CheckConfig::new(PathBuf::from("fixtures")))?;
//! for diagnostic in &report.diagnostics {
//!     println!("{}", diagnostic);
//! }
//! assert!(!report.has_errors());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Only problems that stop a whole run are errors; a file that fails to lex is
//! reported as an error diagnostic and the rest of the tree is still checked.
//!
//! ```rust
//! use doxycheck::{Check, CheckConfig, DoxyCheck, Error};
//! use std::path::PathBuf;
//!
//! let result = DoxyCheck::new().check(&CheckConfig::new(PathBuf::from("nonexistent")));
//! assert!(matches!(result, Err(Error::DirectoryNotFound(_))));
//! ```

mod check;
mod error;
mod parser;

use std::path::PathBuf;

pub use check::{Diagnostic, DoxyCheck, Report, Severity};
pub use error::{Error, Result};
pub use parser::*;

/// Which lints the checker runs. Everything is enabled by default.
///
/// # Examples
///
/// ```
/// use doxycheck::Rules;
///
/// let rules = Rules {
///     undocumented_members: false,
///     ..Rules::default()
/// };
/// assert!(rules.undocumented);
/// assert!(!rules.undocumented_members);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    /// Report declarations without a documentation comment
    pub undocumented: bool,

    /// Report enumerators and fields without a documentation comment
    pub undocumented_members: bool,

    /// Report briefs that run into the detailed description without a blank line
    pub brief_separation: bool,

    /// Report documentation comments that document nothing
    pub unbound_comments: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            undocumented: true,
            undocumented_members: true,
            brief_separation: true,
            unbound_comments: true,
        }
    }
}

/// Configuration for a documentation check.
///
/// # Examples
///
/// ```
/// use doxycheck::{CheckConfig, Rules};
/// use std::path::PathBuf;
///
/// let config = CheckConfig::new(PathBuf::from("include"));
/// assert_eq!(config.rules, Rules::default());
/// ```
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// A source file, or a directory searched recursively for C and C++ sources
    pub root: PathBuf,

    pub rules: Rules,
}

impl CheckConfig {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            rules: Rules::default(),
        }
    }

    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }
}

/// Trait to check the documentation of the sources under a root.
///
/// # Examples
///
/// ```
/// use doxycheck::{Check, CheckConfig, DoxyCheck};
/// use std::path::PathBuf;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = DoxyCheck::new().check(&CheckConfig::new(PathBuf::from("fixtures/sample.cxx")))?;
///
/// assert_eq!(report.files.len(), 1);
/// assert!(report
///     .diagnostics
///     .iter()
///     .any(|d| d.message == "function main is not documented"));
/// # Ok(())
/// # }
/// ```
///
/// # Custom Implementation
///
/// ```
/// use doxycheck::{Check, CheckConfig, Report, Result};
/// use std::path::PathBuf;
///
/// struct NoopCheck;
///
/// impl Check for NoopCheck {
///     fn check(&self, _config: &CheckConfig) -> Result<Report> {
///         Ok(Report::default())
///     }
/// }
///
/// # fn main() -> Result<()> {
/// let report = NoopCheck.check(&CheckConfig::new(PathBuf::from(".")))?;
/// assert_eq!(report.warnings(), 0);
/// # Ok(())
/// # }
/// ```
pub trait Check {
    /// Parse every source under `config.root` and lint the resulting models.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    ///
    /// * The root does not exist
    /// * The root is a file that is not a C or C++ source
    ///
    /// Per-file read and lexing failures are reported as error diagnostics instead.
    fn check(&self, config: &CheckConfig) -> Result<Report>;
}
