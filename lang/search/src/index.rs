use quarry_lang_kernel::{HashMap, Term};

/// Lower values are tried first.
pub type Preference = i32;

pub const DEFAULT_PREFERENCE: Preference = 50;

/// The theorems available to the search, bucketed by the base of their type.
///
/// A theorem whose type base is one of its own parameters, such as `(P : Type) (p : P) : P`,
/// could apply to any goal and is kept in a separate list of generic theorems.
/// Within every list theorems are ordered by preference, ties keep their insertion order.
#[derive(Debug, Default)]
pub struct Index {
    all: Vec<Term>,
    generic: Vec<Term>,
    by_base: HashMap<Term, Vec<Term>>,
}

impl Index {
    pub fn new(theorems: impl IntoIterator<Item = (Term, Preference)>) -> Self {
        let mut entries: Vec<(Term, Preference)> = theorems.into_iter().collect();
        entries.sort_by_key(|(_, preference)| *preference);

        let mut index = Index::default();
        for (thm, _) in entries {
            let base = thm.typ().base();
            if thm.params().contains(base) {
                index.generic.push(thm.clone());
            } else {
                index.by_base.entry(base.clone()).or_default().push(thm.clone());
            }
            index.all.push(thm);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn all(&self) -> &[Term] {
        &self.all
    }

    pub fn generic(&self) -> &[Term] {
        &self.generic
    }

    /// The non-generic theorems whose type has the given base.
    pub fn theorems(&self, base: &Term) -> &[Term] {
        self.by_base.get(base).map(Vec::as_slice).unwrap_or(&[])
    }
}
