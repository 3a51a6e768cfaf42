use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for the doxycheck library.
///
/// Only malformed input that makes a file impossible to tokenize is surfaced as an
/// error. Unrecognized declarations and stray comments are absorbed by the parser.
///
/// # Examples
///
/// ```
/// use doxycheck::Error;
/// use std::path::PathBuf;
///
/// // Create an IO error
/// let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
/// let error = Error::Io(io_err);
/// assert!(matches!(error, Error::Io(_)));
///
/// // An unterminated block comment carries the offset of its opening marker
/// let error = Error::UnterminatedComment { offset: 12 };
/// assert_eq!(error.to_string(), "Unterminated comment starting at offset 12");
///
/// // Create a file not found error
/// let error = Error::FileNotFound(PathBuf::from("missing.c"));
/// assert!(matches!(error, Error::FileNotFound(_)));
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A block comment was opened but never closed
    #[error("Unterminated comment starting at offset {offset}")]
    UnterminatedComment { offset: usize },

    /// File not found error
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Directory not found error
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for doxycheck operations.
///
/// # Examples
///
/// ```
/// use doxycheck::{Result, Error};
/// use std::path::PathBuf;
///
/// fn example_operation() -> Result<String> {
///     Err(Error::FileNotFound(PathBuf::from("missing.c")))
/// }
///
/// match example_operation() {
///     Ok(content) => println!("Success: {}", content),
///     Err(e) => println!("Operation failed: {}", e),
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;
