//! Identifier types used throughout KinVault.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier.
            ///
            /// # Errors
            /// - Returns `Validation` if `id` is empty or whitespace
            pub fn new(id: impl Into<String>) -> crate::Result<Self> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(crate::Error::Validation(concat!(
                        $label,
                        " cannot be empty"
                    )
                    .to_string()));
                }
                Ok(Self(id))
            }

            /// Get the inner string value.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a family group, the tenant boundary for every vault item.
    FamilyId,
    "FamilyId"
);

string_id!(
    /// Identifier of a family member.
    UserId,
    "UserId"
);

string_id!(
    /// Identifier of a vault item, assigned by the record store.
    ItemId,
    "ItemId"
);

/// Location of an object inside the vault bucket.
///
/// Paths are relative to the bucket root, `/`-separated, and never contain
/// empty, `.` or `..` components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectPath {
    components: Vec<String>,
}

impl ObjectPath {
    /// Create a path from string components.
    ///
    /// # Errors
    /// - Returns `Validation` if there are no components
    /// - Returns `Validation` if any component is empty, `.`, `..` or contains a separator
    pub fn from_components(components: Vec<String>) -> crate::Result<Self> {
        if components.is_empty() {
            return Err(crate::Error::Validation(
                "Object path cannot be empty".to_string(),
            ));
        }
        for comp in &components {
            if comp.is_empty() || comp == "." || comp == ".." {
                return Err(crate::Error::Validation(format!(
                    "Invalid object path component: '{}'",
                    comp
                )));
            }
            if comp.contains('/') || comp.contains('\\') {
                return Err(crate::Error::Validation(
                    "Path component cannot contain separators".to_string(),
                ));
            }
        }
        Ok(Self { components })
    }

    /// Parse a `/`-separated path string.
    pub fn parse(path: &str) -> crate::Result<Self> {
        let path = path.trim_start_matches('/').trim_end_matches('/');
        let components: Vec<String> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').map(String::from).collect()
        };
        Self::from_components(components)
    }

    /// Get the parent path, if any.
    pub fn parent(&self) -> Option<Self> {
        if self.components.len() < 2 {
            None
        } else {
            let mut components = self.components.clone();
            components.pop();
            Some(Self { components })
        }
    }

    /// Get the object name (last component).
    pub fn name(&self) -> &str {
        self.components.last().map(|s| s.as_str()).unwrap_or_default()
    }

    /// Join this path with a child component.
    pub fn join(&self, child: &str) -> crate::Result<Self> {
        let mut components = self.components.clone();
        components.push(child.to_string());
        Self::from_components(components)
    }

    /// Get the path components.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Convert to the `/`-joined representation stored on items.
    pub fn to_string_path(&self) -> String {
        self.components.join("/")
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_path())
    }
}

impl TryFrom<String> for ObjectPath {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        Self::parse(&value)
    }
}

impl From<ObjectPath> for String {
    fn from(path: ObjectPath) -> Self {
        path.to_string_path()
    }
}

/// Revealed secret text that zeroizes on drop.
#[derive(Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct SensitiveString(String);

impl SensitiveString {
    /// Wrap plaintext.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Borrow the plaintext.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Get the length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SensitiveString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SensitiveString([REDACTED; {} bytes])", self.0.len())
    }
}
