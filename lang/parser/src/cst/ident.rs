use std::fmt;

use derivative::Derivative;
use quarry_lang_miette_util::Span;

#[derive(Debug, Clone, Derivative)]
#[derivative(Eq, PartialEq, Hash)]
pub struct Ident {
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    pub span: Span,
    pub id: String,
}

/// A dot-separated sequence of identifiers
///
/// ```text
/// Arith.Nat.add
/// ^^^^^^^^^^^^^------ segments
/// ```
#[derive(Debug, Clone, Derivative)]
#[derivative(Eq, PartialEq, Hash)]
pub struct Path {
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    pub span: Span,
    pub segments: Vec<Ident>,
}

impl Path {
    /// The last segment.
    pub fn name(&self) -> &Ident {
        // The grammar only produces paths with at least one segment
        &self.segments[self.segments.len() - 1]
    }

    /// Everything but the last segment.
    pub fn prefix(&self) -> &[Ident] {
        &self.segments[..self.segments.len() - 1]
    }

    pub fn is_simple(&self) -> bool {
        self.segments.len() == 1
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment.id)?;
        }
        Ok(())
    }
}
