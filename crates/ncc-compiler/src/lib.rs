//! # ncc-compiler
//!
//! Compiles flat router configuration text into NETCONF XML.
//!
//! Each configuration line names one schema node relative to the currently
//! open containers: a container or list line opens an element, a leaf line
//! writes a complete element, and `exit` closes the innermost container.
//! Element names are qualified with the namespaces recorded in a
//! [`ncc_schema::SchemaModel`].

pub mod compiler;
pub mod input;
pub mod statement;

pub use compiler::{CompileOptions, ConfigCompiler, compile};
pub use input::ConfigInput;
pub use statement::{Operation, Statement};

use thiserror::Error;

/// Why a configuration line was rejected
#[derive(Error, Debug)]
pub enum ParseCause {
    #[error("unknown element '{element}' under '{parent}'")]
    UnknownElement { element: String, parent: String },

    #[error("exit without an open element")]
    UnmatchedExit,

    #[error("missing exit for '{open}'")]
    MissingExit { open: String },

    #[error("quoted value is not terminated")]
    MalformedQuoting,

    #[error("'{operation}' must be followed by an element")]
    MissingOperand { operation: String },

    #[error("invalid keys specified for '{path}', valid keys: {expected:?} tokens: {found:?}")]
    KeyMismatch {
        path: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("schema error: {0}")]
    Schema(#[from] ncc_schema::SchemaError),

    #[error("XML error: {0}")]
    Xml(#[from] ncc_xml::Error),
}

/// A compile failure, located at the offending input line
#[derive(Error, Debug)]
#[error("Error parsing config, line {line_number}: \"{line_text}\" : {cause}")]
pub struct ConfigParseError {
    /// 1-based line number in the unfiltered input
    pub line_number: usize,
    pub line_text: String,
    pub cause: ParseCause,
}

impl ConfigParseError {
    pub fn new(line_number: usize, line_text: impl Into<String>, cause: ParseCause) -> Self {
        Self {
            line_number,
            line_text: line_text.into(),
            cause,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigParseError>;
