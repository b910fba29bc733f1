//! Instance locations used to key errors and annotations.

use std::fmt;

use serde::{Serialize, Serializer};

/// One step from a value into a child value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathComponent {
    Property(String),
    Index(usize),
}

/// Location of a value inside the instance tree.
///
/// The empty path is the root. Two paths are equal when their component
/// sequences are equal, so callers can correlate errors with UI rows by
/// building the same path independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValidationPath(Vec<PathComponent>);

impl ValidationPath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn components(&self) -> &[PathComponent] {
        &self.0
    }

    /// Path to a named property of the value at this path.
    pub fn property(&self, name: impl Into<String>) -> Self {
        let mut components = self.0.clone();
        components.push(PathComponent::Property(name.into()));
        Self(components)
    }

    /// Path to an array element of the value at this path.
    pub fn index(&self, index: usize) -> Self {
        let mut components = self.0.clone();
        components.push(PathComponent::Index(index));
        Self(components)
    }

    /// Build a path from an RFC 6901 JSON Pointer.
    ///
    /// All-digit segments become indices. Returns `None` for a non-empty
    /// pointer that does not start with `/`.
    pub fn from_pointer(pointer: &str) -> Option<Self> {
        if pointer.is_empty() {
            return Some(Self::root());
        }
        let rest = pointer.strip_prefix('/')?;
        let components = rest
            .split('/')
            .map(|part| {
                let key = part.replace("~1", "/").replace("~0", "~");
                match key.parse::<usize>() {
                    Ok(i) if !key.starts_with('+') => PathComponent::Index(i),
                    _ => PathComponent::Property(key),
                }
            })
            .collect();
        Some(Self(components))
    }
}

impl From<Vec<PathComponent>> for ValidationPath {
    fn from(components: Vec<PathComponent>) -> Self {
        Self(components)
    }
}

/// Renders as a JSON Pointer: `""` for the root, `/a/0` otherwise.
impl fmt::Display for ValidationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for component in &self.0 {
            match component {
                PathComponent::Property(name) => {
                    write!(f, "/{}", name.replace('~', "~0").replace('/', "~1"))?
                }
                PathComponent::Index(i) => write!(f, "/{}", i)?,
            }
        }
        Ok(())
    }
}

impl Serialize for ValidationPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
