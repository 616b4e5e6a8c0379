//! Tokenizing a single configuration line

use crate::ParseCause;

/// NETCONF edit operation requested by a line prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Delete,
    Create,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Create => "create",
        }
    }
}

/// One non-blank configuration line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement<'a> {
    Exit,
    Node {
        operation: Option<Operation>,
        name: &'a str,
        /// Tokens after the name; a quoted run is one token without its quotes
        arguments: Vec<&'a str>,
        /// Leaf value: the arguments joined by one space
        value: Option<String>,
    },
}

impl<'a> Statement<'a> {
    /// Parse a trimmed, non-blank line.
    pub fn parse(line: &'a str) -> Result<Self, ParseCause> {
        let (head, rest) = split_token(line);
        if head == "exit" {
            return Ok(Self::Exit);
        }

        let (operation, (name, rest)) = match head {
            "delete" => (Some(Operation::Delete), split_token(rest)),
            "create" => (Some(Operation::Create), split_token(rest)),
            _ => (None, (head, rest)),
        };
        if name.is_empty() {
            return Err(ParseCause::MissingOperand {
                operation: head.to_string(),
            });
        }

        let arguments = tokenize(rest)?;
        let value = (!arguments.is_empty()).then(|| arguments.join(" "));

        Ok(Self::Node {
            operation,
            name,
            arguments,
            value,
        })
    }

    /// Tokens following the name, as used for list keys
    pub fn arguments(&self) -> &[&'a str] {
        match self {
            Self::Exit => &[],
            Self::Node { arguments, .. } => arguments,
        }
    }
}

fn split_token(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (text, ""),
    }
}

/// Split on whitespace, keeping each `"..."` run as one verbatim token.
/// An opening quote without a closing one is an error.
fn tokenize(text: &str) -> Result<Vec<&str>, ParseCause> {
    let mut tokens = Vec::new();
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        if let Some(quoted) = rest.strip_prefix('"') {
            let close = quoted.find('"').ok_or(ParseCause::MalformedQuoting)?;
            tokens.push(&quoted[..close]);
            rest = &quoted[close + 1..];
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            tokens.push(&rest[..end]);
            rest = &rest[end..];
        }
        rest = rest.trim_start();
    }
    Ok(tokens)
}
