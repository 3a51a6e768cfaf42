use crate::{
    Check, CheckConfig, Error, Result, Rules,
    parser::{DocumentEntry, FileUnit, Span, parse_source},
};
use ignore::Walk;
use serde::Serialize;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extensions of the C and C++ sources the checker reads
const SOURCE_EXTENSIONS: &[&str] = &["c", "h", "cc", "cpp", "cxx", "hpp", "hh", "hxx"];

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A documentation problem found in a source file.
///
/// # Examples
///
/// ```
/// use doxycheck::{Diagnostic, Severity};
/// use std::path::PathBuf;
///
/// let diagnostic = Diagnostic {
///     path: PathBuf::from("main.cxx"),
///     line: 42,
///     severity: Severity::Warning,
///     message: "class MyClass is not documented".to_string(),
/// };
/// assert_eq!(
///     diagnostic.to_string(),
///     "main.cxx:42: warning: class MyClass is not documented"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.path.display(),
            self.line,
            self.severity,
            self.message
        )
    }
}

/// Parsed files and the diagnostics found in them
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    /// Successfully parsed files, in path order
    pub files: Vec<FileUnit>,

    /// Diagnostics grouped by file in path order, then by line
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.errors() > 0
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// The documentation checker implementation
#[derive(Debug, Clone, Default)]
pub struct DoxyCheck;

impl DoxyCheck {
    pub fn new() -> Self {
        Self
    }

    /// Whether the path looks like a C or C++ source file
    fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
    }

    /// Resolve the root into the list of files to check, sorted by path
    fn collect_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.exists() {
            return Err(if self.is_source(root) {
                Error::FileNotFound(root.to_path_buf())
            } else {
                Error::DirectoryNotFound(root.to_path_buf())
            });
        }

        if root.is_file() {
            if !self.is_source(root) {
                return Err(Error::InvalidConfig(format!(
                    "{} is not a C or C++ source file",
                    root.display()
                )));
            }
            return Ok(vec![root.to_path_buf()]);
        }

        let mut files: Vec<PathBuf> = Walk::new(root)
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && self.is_source(p))
            .collect();
        files.sort();
        Ok(files)
    }

    /// Parse one file, recording it and its diagnostics in the report
    fn check_file(&self, path: &Path, rules: &Rules, report: &mut Report) {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read source file");
                report.diagnostics.push(Diagnostic {
                    path: path.to_path_buf(),
                    line: 1,
                    severity: Severity::Error,
                    message: format!("cannot read file: {}", e),
                });
                return;
            }
        };

        match parse_source(&source) {
            Ok(model) => {
                let file = FileUnit {
                    path: path.to_path_buf(),
                    source,
                    model,
                };
                let diagnostics = self.lint(&file, rules);
                debug!(
                    path = %path.display(),
                    declarations = file.model.len(),
                    diagnostics = diagnostics.len(),
                    "checked file"
                );
                report.diagnostics.extend(diagnostics);
                report.files.push(file);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse source file");
                let line = match e {
                    Error::UnterminatedComment { offset } => Span::new(offset, offset).line(&source),
                    _ => 1,
                };
                report.diagnostics.push(Diagnostic {
                    path: path.to_path_buf(),
                    line,
                    severity: Severity::Error,
                    message: e.to_string(),
                });
            }
        }
    }

    /// Run the enabled rules over a parsed file
    fn lint(&self, file: &FileUnit, rules: &Rules) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut warn_at = |span: Span, message: String| {
            diagnostics.push(Diagnostic {
                path: file.path.clone(),
                line: span.line(&file.source),
                severity: Severity::Warning,
                message,
            });
        };

        for entry in file.model.iter() {
            match &entry.doc {
                None if rules.undocumented => {
                    warn_at(entry.span, format!("{} {} is not documented", entry.kind, entry.name))
                }
                Some(doc) if rules.brief_separation && doc.multiline_brief => {
                    warn_at(doc.span, brief_message(&entry.name))
                }
                _ => {}
            }

            for member in &entry.members {
                match &member.doc {
                    None if rules.undocumented_members => warn_at(
                        member.member.span,
                        format!(
                            "member '{}' of {} is not documented",
                            member.member.name,
                            qualified(entry)
                        ),
                    ),
                    Some(doc) if rules.brief_separation && doc.multiline_brief => {
                        warn_at(doc.span, brief_message(&member.member.name))
                    }
                    _ => {}
                }
            }
        }

        if rules.unbound_comments {
            for doc in &file.model.unbound {
                warn_at(
                    doc.span,
                    "documentation comment is not attached to any declaration".to_string(),
                );
            }
        }

        diagnostics.sort_by_key(|d| d.line);
        diagnostics
    }
}

fn qualified(entry: &DocumentEntry) -> String {
    format!("{} {}", entry.kind, entry.name)
}

fn brief_message(name: &str) -> String {
    format!(
        "brief description of '{}' spans several lines; separate the detailed description with a blank line",
        name
    )
}

impl Check for DoxyCheck {
    fn check(&self, config: &CheckConfig) -> Result<Report> {
        let files = self.collect_files(&config.root)?;
        debug!(root = %config.root.display(), files = files.len(), "checking sources");

        let mut report = Report::default();
        for path in &files {
            self.check_file(path, &config.rules, &mut report);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn messages(report: &Report) -> Vec<(usize, &str)> {
        report
            .diagnostics
            .iter()
            .map(|d| (d.line, d.message.as_str()))
            .collect()
    }

    #[test]
    fn test_is_source() {
        let checker = DoxyCheck::new();
        for name in ["a.c", "a.h", "a.cc", "a.cpp", "a.cxx", "a.hpp", "a.hh", "a.hxx"] {
            assert!(checker.is_source(&PathBuf::from(name)), "{}", name);
        }
        assert!(!checker.is_source(&PathBuf::from("a.rs")));
        assert!(!checker.is_source(&PathBuf::from("Makefile")));
    }

    #[test]
    fn test_check_fixture() {
        let checker = DoxyCheck::new();
        let report = checker
            .check(&CheckConfig::new(PathBuf::from("fixtures/sample.cxx")))
            .unwrap();

        assert_eq!(report.files.len(), 1);
        assert_eq!(report.errors(), 0);
        assert_eq!(
            messages(&report),
            vec![
                (42, "class MyClass is not documented"),
                (44, "member 'var' of class MyClass is not documented"),
                (47, "function my_function is not documented"),
                (51, "function main is not documented"),
            ]
        );
        assert_eq!(
            report.diagnostics[0].to_string(),
            "fixtures/sample.cxx:42: warning: class MyClass is not documented"
        );
    }

    #[test]
    fn test_rules_can_be_disabled() {
        let checker = DoxyCheck::new();
        let config = CheckConfig::new(PathBuf::from("fixtures/sample.cxx")).with_rules(Rules {
            undocumented_members: false,
            ..Rules::default()
        });
        let report = checker.check(&config).unwrap();
        assert_eq!(report.warnings(), 3);
    }

    #[test]
    fn test_brief_and_unbound_lints() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("lint.h"),
            "/** First line\n * runs on without a blank line\n */\n#define A 1\n\n/// Orphan\nint counter = 0;\n",
        )
        .unwrap();

        let report = DoxyCheck::new()
            .check(&CheckConfig::new(dir.path().to_path_buf()))
            .unwrap();
        assert_eq!(
            messages(&report),
            vec![
                (
                    1,
                    "brief description of 'A' spans several lines; separate the detailed description with a blank line"
                ),
                (6, "documentation comment is not attached to any declaration"),
            ]
        );
    }

    #[test]
    fn test_check_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.h"), "/// Documented\n#define B 1\n").unwrap();
        std::fs::write(dir.path().join("a.c"), "int a;\n\n/** never closed\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "/** not a source").unwrap();

        let report = DoxyCheck::new()
            .check(&CheckConfig::new(dir.path().to_path_buf()))
            .unwrap();

        assert_eq!(report.files.len(), 1);
        assert!(report.files[0].path.ends_with("b.h"));
        assert_eq!(report.errors(), 1);
        assert_eq!(report.warnings(), 0);

        let error = &report.diagnostics[0];
        assert!(error.path.ends_with("a.c"));
        assert_eq!(error.line, 3);
        assert_eq!(error.message, "Unterminated comment starting at offset 8");
        assert!(report.has_errors());
    }

    #[test]
    fn test_missing_root() {
        let checker = DoxyCheck::new();
        let result = checker.check(&CheckConfig::new(PathBuf::from("missing/dir")));
        assert!(matches!(result, Err(Error::DirectoryNotFound(_))));

        let result = checker.check(&CheckConfig::new(PathBuf::from("missing.cpp")));
        assert!(matches!(result, Err(Error::FileNotFound(_))));

        let result = checker.check(&CheckConfig::new(PathBuf::from("Cargo.toml")));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
