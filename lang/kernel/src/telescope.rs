use std::ops::Add;

use crate::term::Term;

/// An ordered list of parameters, where each parameter may only refer to earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Telescope {
    terms: Vec<Term>,
}

impl Telescope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, term: Term) {
        self.terms.push(term);
    }

    pub fn extend(&mut self, other: Telescope) {
        self.terms.extend(other.terms);
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn contains(&self, term: &Term) -> bool {
        self.terms.contains(term)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Term> {
        self.terms.iter()
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// The parameters which are not marked implicit.
    pub fn explicit(&self) -> Vec<Term> {
        self.terms.iter().filter(|term| !term.implicit()).cloned().collect()
    }

    /// Split into groups of parameters that do not refer to each other.
    ///
    /// A parameter joins the group of every earlier parameter its signature depends on.
    /// Groups are ordered by their first parameter and keep the relative order of the telescope.
    pub fn split(&self) -> Vec<Telescope> {
        let n = self.terms.len();
        let mut groups = UnionFind::new(n);
        for j in 0..n {
            for i in 0..j {
                if self.terms[j].signature_depends_on(std::slice::from_ref(&self.terms[i])) {
                    groups.union(i, j);
                }
            }
        }

        let mut result: Vec<Telescope> = Vec::new();
        let mut group_of_root: Vec<Option<usize>> = vec![None; n];
        for (i, term) in self.terms.iter().enumerate() {
            let root = groups.find(i);
            let idx = *group_of_root[root].get_or_insert_with(|| {
                result.push(Telescope::new());
                result.len() - 1
            });
            result[idx].push(term.clone());
        }
        result
    }
}

impl From<Vec<Term>> for Telescope {
    fn from(terms: Vec<Term>) -> Self {
        Telescope { terms }
    }
}

impl FromIterator<Term> for Telescope {
    fn from_iter<T: IntoIterator<Item = Term>>(iter: T) -> Self {
        Telescope { terms: iter.into_iter().collect() }
    }
}

impl IntoIterator for Telescope {
    type Item = Term;
    type IntoIter = std::vec::IntoIter<Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.into_iter()
    }
}

impl<'a> IntoIterator for &'a Telescope {
    type Item = &'a Term;
    type IntoIter = std::slice::Iter<'a, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}

impl Add for Telescope {
    type Output = Telescope;

    fn add(mut self, rhs: Telescope) -> Telescope {
        self.extend(rhs);
        self
    }
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        UnionFind { parent: (0..n).collect() }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, i: usize, j: usize) {
        let (ri, rj) = (self.find(i), self.find(j));
        if ri != rj {
            // The smaller index stays the root.
            let (lo, hi) = if ri < rj { (ri, rj) } else { (rj, ri) };
            self.parent[hi] = lo;
        }
    }
}
