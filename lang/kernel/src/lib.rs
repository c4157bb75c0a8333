//! The logical kernel: terms, telescopes and the matcher which unifies them.
//!
//! Every value of the theory is a [Term]. A term is either a *declaration* (a primitive constant,
//! possibly with parameters) or a *specialization* (a declaration applied to arguments). Both kinds
//! carry their own [Telescope] of remaining parameters. Unification and substitution are performed
//! by a [Matcher], which treats a chosen list of terms as indeterminates.

mod matcher;
mod print;
mod result;
mod telescope;
mod term;

pub use matcher::Matcher;
pub use print::{Definition, PrintDefinition};
pub use result::*;
pub use telescope::Telescope;
pub use term::Term;

pub type HashMap<K, V> = std::collections::HashMap<K, V, fxhash::FxBuildHasher>;
pub type HashSet<V> = fxhash::FxHashSet<V>;
