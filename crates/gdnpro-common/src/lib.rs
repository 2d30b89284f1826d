//! gdnpro-common: shared error type and path utilities.
//!
//! - **Error Handling**: a common error type and result alias used by the
//!   storage crate and the CLI
//! - **Path Utilities**: file type detection by extension and the rule that
//!   maps a source document to its rendered output path
//!
//! # Examples
//!
//! ```
//! use gdnpro_common::paths::{destination_path, is_pdf_file};
//! use std::path::Path;
//!
//! assert!(is_pdf_file(Path::new("report.pdf")));
//!
//! let dest = destination_path(Path::new("/a/doc1.pdf"), None, "gif");
//! assert_eq!(dest, Path::new("/a/doc1.gif"));
//! ```

pub mod error;
pub mod paths;

pub use error::{Error, Result};
