//! Test identity value type
//!
//! A test case is identified by its fully-qualified class name and its method
//! name. Identities are built once per discovered test and never mutated.

use super::SelectorError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Fully-qualified class name plus method name of a single test case
///
/// Both names are guaranteed non-empty. Fields are private so an identity
/// that passed construction cannot be edited into an invalid one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TestIdentity {
    class_name: String,
    method_name: String,
}

impl TestIdentity {
    /// Create a new identity
    ///
    /// # Errors
    /// Returns `SelectorError::InvalidIdentity` if either name is empty.
    pub fn new(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
    ) -> Result<Self, SelectorError> {
        let class_name = class_name.into();
        let method_name = method_name.into();

        if class_name.is_empty() {
            return Err(SelectorError::InvalidIdentity(format!(
                "class name is empty (method '{}')",
                method_name
            )));
        }
        if method_name.is_empty() {
            return Err(SelectorError::InvalidIdentity(format!(
                "method name is empty (class '{}')",
                class_name
            )));
        }

        Ok(Self {
            class_name,
            method_name,
        })
    }

    /// Get the fully-qualified class name
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Get the method name
    pub fn method_name(&self) -> &str {
        &self.method_name
    }
}

impl fmt::Display for TestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.class_name, self.method_name)
    }
}

/// Parses the `Class#method` form used in test-list files
impl FromStr for TestIdentity {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (class_name, method_name) = s.split_once('#').ok_or_else(|| {
            SelectorError::InvalidIdentity(format!("'{}' is not of the form Class#method", s))
        })?;
        Self::new(class_name, method_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_accessors() {
        let id = TestIdentity::new("com.example.FooTest", "testBar").unwrap();
        assert_eq!(id.class_name(), "com.example.FooTest");
        assert_eq!(id.method_name(), "testBar");
    }

    #[test]
    fn test_identity_rejects_empty_class() {
        let err = TestIdentity::new("", "testBar").unwrap_err();
        assert!(matches!(err, SelectorError::InvalidIdentity(_)));
    }

    #[test]
    fn test_identity_rejects_empty_method() {
        let err = TestIdentity::new("com.example.FooTest", "").unwrap_err();
        assert!(err.to_string().contains("method name is empty"));
    }

    #[test]
    fn test_identity_structural_equality() {
        let a = TestIdentity::new("A", "m").unwrap();
        let b = TestIdentity::new(String::from("A"), String::from("m")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, TestIdentity::new("A", "n").unwrap());
    }

    #[test]
    fn test_identity_display_and_parse() {
        let id: TestIdentity = "com.example.FooTest#testBar".parse().unwrap();
        assert_eq!(id.to_string(), "com.example.FooTest#testBar");
    }

    #[test]
    fn test_identity_parse_without_separator_fails() {
        assert!("com.example.FooTest".parse::<TestIdentity>().is_err());
        assert!("#testBar".parse::<TestIdentity>().is_err());
        assert!("com.example.FooTest#".parse::<TestIdentity>().is_err());
    }
}
