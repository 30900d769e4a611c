//! Ordered selector list and the include/exclude decision
//!
//! The first selector (in construction order) that matches a test decides
//! its fate. When none match, the list's default verdict applies.

use super::{Selector, SelectorError, TestIdentity};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix marking a raw builder entry as a path to a file of selectors
const FILE_PREFIX: char = ':';
const FILE_COMMENT_PREFIX: &str = "//";

/// How the verdict for tests that match no selector is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultPolicy {
    /// Unmatched tests run
    #[default]
    Include,
    /// Unmatched tests are skipped
    Exclude,
    /// Opposite of the last selector's polarity (include when the list is empty)
    ///
    /// `Foo` alone runs only `Foo`; `!Foo` alone runs everything but `Foo`.
    Inferred,
}

impl DefaultPolicy {
    /// Resolve the policy to a concrete verdict for the given selectors
    pub fn resolve(self, selectors: &[Selector]) -> bool {
        match self {
            Self::Include => true,
            Self::Exclude => false,
            Self::Inferred => selectors.last().is_none_or(|last| !last.is_inclusive()),
        }
    }
}

/// Why a verdict was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    /// The selector at this index (0-based, list order) matched first
    Selector(usize),
    /// No selector matched
    Default,
}

/// Outcome of evaluating one test against a [`SelectorList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub included: bool,
    pub reason: MatchReason,
}

/// Ordered selectors plus the fallback verdict
///
/// Holds no mutable state; `decide` can be called from many threads at once.
#[derive(Debug, Clone)]
pub struct SelectorList {
    selectors: Vec<Selector>,
    default_verdict: bool,
}

impl SelectorList {
    /// Create a list that evaluates `selectors` in the given order
    pub fn new(selectors: Vec<Selector>, default_verdict: bool) -> Self {
        Self {
            selectors,
            default_verdict,
        }
    }

    /// A list with no selectors: every test gets `default_verdict`
    pub fn empty(default_verdict: bool) -> Self {
        Self::new(Vec::new(), default_verdict)
    }

    pub fn builder() -> SelectorListBuilder {
        SelectorListBuilder::default()
    }

    /// Decide whether `identity` should run
    ///
    /// Returns the polarity of the first matching selector, or the default
    /// verdict when nothing matches. Later selectors are never consulted
    /// once one has matched.
    pub fn decide(&self, identity: &TestIdentity) -> bool {
        self.decide_with_reason(identity).included
    }

    /// Like [`decide`](Self::decide), but also reports which selector decided
    pub fn decide_with_reason(&self, identity: &TestIdentity) -> Verdict {
        let verdict = self
            .selectors
            .iter()
            .position(|selector| selector.matches(identity))
            .map_or(
                Verdict {
                    included: self.default_verdict,
                    reason: MatchReason::Default,
                },
                |index| Verdict {
                    included: self.selectors[index].is_inclusive(),
                    reason: MatchReason::Selector(index),
                },
            );

        tracing::trace!(
            test = %identity,
            included = verdict.included,
            reason = ?verdict.reason,
            "Evaluated test against selectors"
        );

        verdict
    }

    /// Whether any test in `class_name` could be included
    ///
    /// Used to skip whole classes before their methods are enumerated. A
    /// matching selector that covers every method settles the answer; an
    /// inclusive selector restricted to some methods means "possibly"; an
    /// exclusive one restricted to some methods leaves the others open.
    pub fn possibly_includes_class(&self, class_name: &str) -> bool {
        for selector in &self.selectors {
            if !selector.matches_class(class_name) {
                continue;
            }
            if selector.is_match_any_method() || selector.is_inclusive() {
                return selector.is_inclusive();
            }
        }
        self.default_verdict
    }

    /// Iterate over the identities this list includes, preserving input order
    pub fn filter<'a, I>(&'a self, identities: I) -> impl Iterator<Item = &'a TestIdentity> + 'a
    where
        I: IntoIterator<Item = &'a TestIdentity>,
        I::IntoIter: 'a,
    {
        identities
            .into_iter()
            .filter(move |identity| self.decide(identity))
    }

    /// One line per selector in evaluation order, then the default
    pub fn explain(&self) -> Vec<String> {
        self.selectors
            .iter()
            .map(Selector::explain)
            .chain(std::iter::once(format!(
                "default:{}",
                if self.default_verdict {
                    "include"
                } else {
                    "exclude"
                }
            )))
            .collect()
    }

    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    pub fn default_verdict(&self) -> bool {
        self.default_verdict
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

/// Accumulates selectors in order, then resolves the default policy
#[derive(Debug, Default)]
pub struct SelectorListBuilder {
    selectors: Vec<Selector>,
    default_policy: DefaultPolicy,
}

impl SelectorListBuilder {
    /// Parse and append one raw rule
    ///
    /// An entry of the form `:path` reads rules from `path`, one per line,
    /// skipping blank lines and lines starting with `//`. The file's rules
    /// are inserted at this position.
    ///
    /// # Errors
    /// Returns the first parse or read error. The builder is consumed, so a
    /// failed entry ends construction of the list.
    pub fn add_raw_selector(mut self, raw: &str) -> Result<Self, SelectorError> {
        match raw.strip_prefix(FILE_PREFIX) {
            Some(path) => {
                let loaded = load_selector_file(Path::new(path))?;
                self.selectors.extend(loaded);
            }
            None => self.selectors.push(Selector::parse(raw)?),
        }
        Ok(self)
    }

    /// Parse and append several raw rules in order
    pub fn add_raw_selectors<I, S>(self, raws: I) -> Result<Self, SelectorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raws.into_iter()
            .try_fold(self, |builder, raw| builder.add_raw_selector(raw.as_ref()))
    }

    /// Append an already-parsed selector
    pub fn add_selector(mut self, selector: Selector) -> Self {
        self.selectors.push(selector);
        self
    }

    pub fn default_policy(mut self, policy: DefaultPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    pub fn build(self) -> SelectorList {
        let default_verdict = self.default_policy.resolve(&self.selectors);
        SelectorList::new(self.selectors, default_verdict)
    }
}

fn load_selector_file(path: &Path) -> Result<Vec<Selector>, SelectorError> {
    let path_display = path.display().to_string();

    let content =
        std::fs::read_to_string(path).map_err(|source| SelectorError::SelectorFileRead {
            path: path_display.clone(),
            source,
        })?;

    let selectors = content
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with(FILE_COMMENT_PREFIX))
        .map(|(line_number, line)| {
            Selector::parse(line).map_err(|source| SelectorError::InFile {
                path: path_display.clone(),
                line: line_number,
                source: Box::new(source),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        path = %path_display,
        count = selectors.len(),
        "Loaded test selectors from file"
    );

    Ok(selectors)
}
