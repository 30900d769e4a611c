//! Test selection
//!
//! Turns textual selector rules into compiled [`Selector`]s and evaluates an
//! ordered [`SelectorList`] against [`TestIdentity`] values to decide whether
//! each test runs.
//!
//! Rule syntax is `["!"] [class-part] ["#" [method-part]]`:
//!
//! | Rule                       | Meaning                                   |
//! |----------------------------|-------------------------------------------|
//! | `#`                        | include every test                        |
//! | `!#`                       | exclude every test                        |
//! | `com.example.Test`         | include methods of matching classes       |
//! | `com.example.Test#testX`   | include matching methods of matching classes |
//! | `#testX`                   | include matching methods of any class     |
//! | `!com.example.Test#`       | exclude every method of matching classes  |

mod identity;
mod list;
mod selector;

pub use identity::TestIdentity;
pub use list::{DefaultPolicy, MatchReason, SelectorList, SelectorListBuilder, Verdict};
pub use selector::Selector;

use thiserror::Error;

/// Errors raised while building selectors, selector lists, or identities
///
/// Matching never fails; everything that can go wrong is rejected here at
/// construction time.
#[derive(Error, Debug)]
pub enum SelectorError {
    /// Empty rule handed to the parser (caller bug, not a user syntax error)
    #[error("Cannot build a test selector from an empty string")]
    EmptyRule,

    #[error("Test selector '{rule}' contains more than one '#'")]
    MultipleSeparators { rule: String },

    #[error("Regular expression error in test selector '{rule}': {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to read test selector file {path}")]
    SelectorFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid test selector at {path}:{line}: {source}")]
    InFile {
        path: String,
        line: usize,
        #[source]
        source: Box<SelectorError>,
    },

    #[error("Invalid test identity: {0}")]
    InvalidIdentity(String),
}

impl SelectorError {
    /// True for errors caused by malformed user-authored rule text
    pub fn is_syntax_error(&self) -> bool {
        match self {
            Self::MultipleSeparators { .. } | Self::InvalidPattern { .. } => true,
            Self::InFile { source, .. } => source.is_syntax_error(),
            Self::EmptyRule | Self::SelectorFileRead { .. } | Self::InvalidIdentity(_) => false,
        }
    }

    /// The rule string that caused the error, when there is one
    pub fn rule(&self) -> Option<&str> {
        match self {
            Self::MultipleSeparators { rule } | Self::InvalidPattern { rule, .. } => Some(rule),
            Self::InFile { source, .. } => source.rule(),
            _ => None,
        }
    }
}
