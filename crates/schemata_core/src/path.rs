//! Location of a node inside a data tree.
//!
//! A `Path` is accumulated during recursive descent and rendered into the
//! `users[2].email` form used by every violation message. It exists only for
//! the duration of one validation call.

use std::fmt;

/// One step of descent into a data tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Descent into a mapping by key
    Key(String),
    /// Descent into a sequence by position
    Index(usize),
}

/// An ordered sequence of keys and indices identifying one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The path of the document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns true if no descent has happened yet.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a new path extended by a mapping key.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(key.into()));
        Self { segments }
    }

    /// Returns a new path extended by a sequence index.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", key)?;
                }
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}
