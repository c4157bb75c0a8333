use std::cell::RefCell;

use crate::HashMap;
use crate::print::PrintDefinition;
use crate::telescope::Telescope;
use crate::term::Term;

/// A scope of indeterminates together with the solutions found for them so far.
///
/// Scopes form a chain: a child scope can see the indeterminates and solutions of all its
/// ancestors. Solutions for an indeterminate are recorded in the scope that declared it.
pub struct Matcher<'p> {
    parent: Option<&'p Matcher<'p>>,
    indeterminates: Vec<Term>,
    solutions: RefCell<HashMap<Term, Term>>,
}

impl Matcher<'static> {
    pub fn new(indeterminates: Vec<Term>) -> Self {
        Matcher { parent: None, indeterminates, solutions: RefCell::default() }
    }

    /// A root scope which starts out with the given solutions.
    pub fn with_solutions(indeterminates: Vec<Term>, solutions: HashMap<Term, Term>) -> Self {
        Matcher { parent: None, indeterminates, solutions: RefCell::new(solutions) }
    }
}

impl<'p> Matcher<'p> {
    /// A nested scope with additional indeterminates.
    pub fn child(&self, indeterminates: Vec<Term>) -> Matcher<'_> {
        Matcher { parent: Some(self), indeterminates, solutions: RefCell::default() }
    }

    pub fn indeterminates(&self) -> &[Term] {
        &self.indeterminates
    }

    /// The solutions recorded in this scope, not including those of its ancestors.
    pub fn solutions(&self) -> HashMap<Term, Term> {
        self.solutions.borrow().clone()
    }

    /// This scope followed by all of its ancestors.
    fn frames(&self) -> impl Iterator<Item = &Matcher<'p>> {
        std::iter::successors(Some(self), |m| m.parent)
    }

    fn position(&self, f: &Term) -> Option<usize> {
        self.indeterminates.iter().position(|ind| ind == f)
    }

    /// Whether `f` is an indeterminate of this scope or of any ancestor.
    pub fn is_indeterminate(&self, f: &Term) -> bool {
        self.frames().any(|m| m.indeterminates.contains(f))
    }

    /// Record that `f` should be replaced by `g`.
    ///
    /// Returns `false` if this contradicts what is already known about `f`.
    pub fn put_solution(&self, f: &Term, g: &Term) -> bool {
        // Never map a term to itself.
        if f == g {
            return true;
        }

        if let Some(h) = self.get_solution(g) {
            return self.put_solution(f, &h);
        }

        // Only solutions of this scope count here, a child may overwrite ancestors.
        let existing = self.solutions.borrow().get(f).cloned();
        if let Some(k) = existing {
            if k.equivalent(g) {
                return true;
            }
            if self.is_indeterminate(g) {
                return self.put_solution(g, &k);
            }
            if self.is_indeterminate(&k) {
                return self.put_solution(&k, g);
            }
            return self.matches(&k, g);
        }

        self.solutions.borrow_mut().insert(f.clone(), g.clone());
        true
    }

    /// The solution of `f`, resolved transitively through this scope and its ancestors.
    pub fn get_solution(&self, f: &Term) -> Option<Term> {
        let direct = self.solutions.borrow().get(f).cloned();
        match direct {
            None => self.parent.and_then(|parent| parent.get_solution(f)),
            Some(g) => Some(self.get_solution(&g).unwrap_or(g)),
        }
    }

    /// Whether `f` is fully determined by the solutions found so far.
    ///
    /// A declaration which is not an indeterminate anywhere is its own solution.
    pub fn has_solution(&self, f: &Term) -> bool {
        if f.is_base() {
            match self.frames().find(|m| m.indeterminates.contains(f)) {
                Some(m) => m.solutions.borrow().contains_key(f),
                None => true,
            }
        } else {
            self.has_solution(f.base()) && f.arguments().iter().all(|arg| self.has_solution(arg))
        }
    }

    /// Whether every indeterminate of this scope has a solution.
    pub fn solved(&self) -> bool {
        let solutions = self.solutions.borrow();
        self.indeterminates.iter().all(|f| solutions.contains_key(f))
    }

    /// Unify `f` and `g`, recording solutions for indeterminates on the way.
    pub fn matches(&self, f: &Term, g: &Term) -> bool {
        if f == g {
            return true;
        }
        // A universe only matches itself
        if f.is_universe() || g.is_universe() {
            return false;
        }

        let n = f.params().len();
        if n != g.params().len() {
            return false;
        }

        // Parameters are matched in their own scope
        let sub;
        let scope: &Matcher<'_> = if n > 0 {
            sub = self.child(f.params().terms().to_vec());
            &sub
        } else {
            self
        };
        for (p, q) in f.params().iter().zip(g.params().iter()) {
            if p.implicit() != q.implicit() || !scope.matches(p, q) {
                return false;
            }
        }

        if !scope.matches(f.typ(), g.typ()) {
            return false;
        }

        // f and g now agree up to their signature
        for m in self.frames() {
            // The earlier indeterminate is mapped to the later one
            match (m.position(f), m.position(g)) {
                (Some(i), Some(j)) if i < j => return m.put_solution(f, g),
                (Some(_), Some(_)) => return m.put_solution(g, f),
                (Some(_), None) => return m.put_solution(f, g),
                (None, Some(_)) => return m.put_solution(g, f),
                (None, None) => {}
            }
        }

        let f_base = f.base();
        let g_base = g.base();
        let bases_match = f_base == g_base
            || ((self.is_indeterminate(f_base) || self.is_indeterminate(g_base))
                && self.matches(f_base, g_base));
        if !bases_match {
            return false;
        }

        f.arguments().iter().zip(g.arguments()).all(|(a, b)| scope.matches(a, b))
    }

    /// Like [Matcher::matches], for matches that hold by construction.
    ///
    /// # Panics
    ///
    /// Panics if `f` and `g` do not match.
    pub fn assert_matches(&self, f: &Term, g: &Term) {
        assert!(
            self.matches(f, g),
            "matching {} to {} failed",
            f.print_definition_to_string(),
            g.print_definition_to_string()
        );
    }

    /// Apply all solutions to `f`.
    ///
    /// Terms which are not affected by any solution are returned as they are.
    pub fn convert(&self, f: &Term) -> Term {
        if let Some(g) = self.get_solution(f) {
            return g;
        }

        if f.is_base() || self.frames().all(|m| m.solutions.borrow().is_empty()) {
            return f.clone();
        }

        let (params, sub) = self.clone_telescope(&Telescope::new(), f.params());
        let scope: &Matcher<'_> = match &sub {
            Some(sub) => sub,
            None => self,
        };

        let mut changes = false;
        let mut arguments = Vec::with_capacity(f.arguments().len());
        for arg in f.arguments() {
            let converted = scope.convert(arg);
            changes |= !converted.equivalent(arg);
            arguments.push(converted);
        }

        let f_base = f.base();
        let base = match self.get_solution(f_base) {
            Some(solution) if &solution != f_base => {
                changes = true;
                solution
            }
            _ => f_base.clone(),
        };

        if !changes {
            return f.clone();
        }

        // The type is determined by the arguments given to the base, so it is recomputed
        let base_params = base.params().terms().to_vec();
        let sub_sub = scope.child(base_params.clone());
        for (param, arg) in base_params.iter().zip(&arguments) {
            sub_sub.assert_matches(param, arg);
        }
        let typ = sub_sub.convert(f.typ());
        Term::specialization_unchecked(params, typ, base, arguments)
    }

    pub fn convert_all(&self, fs: &[Term]) -> Vec<Term> {
        fs.iter().map(|f| self.convert(f)).collect()
    }

    /// Clone every term of `telescope`, prefixing each clone with the parameters `prefix`.
    ///
    /// Also returns the scope which maps the original terms to their clones,
    /// or `None` if the telescope is empty.
    pub fn clone_telescope(
        &self,
        prefix: &Telescope,
        telescope: &Telescope,
    ) -> (Telescope, Option<Matcher<'_>>) {
        self.clone_telescope_renamed(prefix, telescope, |_| None)
    }

    /// Like [Matcher::clone_telescope], but the clone of `f` is named `rename(f)` when that is
    /// not `None`.
    pub fn clone_telescope_renamed<R>(
        &self,
        prefix: &Telescope,
        telescope: &Telescope,
        rename: R,
    ) -> (Telescope, Option<Matcher<'_>>)
    where
        R: Fn(&Term) -> Option<String>,
    {
        if telescope.is_empty() {
            return (Telescope::new(), None);
        }

        let sub = self.child(telescope.terms().to_vec());
        let prefix_args: Vec<Option<Term>> = prefix.iter().cloned().map(Some).collect();
        let mut cloned = Telescope::new();
        for f in telescope {
            let clone = sub.clone_term_as(prefix, f, rename(f));
            let applied = clone
                .specialize(Telescope::new(), &prefix_args)
                .unwrap_or_else(|err| panic!("clone of {f:?} does not accept its prefix: {err}"));
            sub.assert_matches(f, &applied);
            cloned.push(clone);
        }
        (cloned, Some(sub))
    }

    /// A structurally fresh copy of `f` with the solutions of this scope applied.
    ///
    /// The parameters of the copy are `prefix` followed by copies of the parameters of `f`.
    pub fn clone_term(&self, prefix: &Telescope, f: &Term) -> Term {
        self.clone_term_as(prefix, f, None)
    }

    fn clone_term_as(&self, prefix: &Telescope, f: &Term, name: Option<String>) -> Term {
        let (params, sub) = self.clone_telescope(&Telescope::new(), f.params());
        let scope: &Matcher<'_> = match &sub {
            Some(sub) => sub,
            None => self,
        };
        let params = prefix.clone() + params;
        let typ = scope.convert(f.typ());
        let clone = if f.is_base() {
            Term::declaration(params, typ)
        } else {
            let arguments = scope.convert_all(f.arguments());
            Term::specialization_unchecked(params, typ, scope.convert(f.base()), arguments)
        };
        match name {
            Some(name) => {
                clone.set_name(name);
                clone.set_implicit(f.implicit());
            }
            None => clone.inherit_metadata(f),
        }
        clone
    }

    /// Clone `f` only when its signature mentions an indeterminate.
    pub fn cheap_clone(&self, f: &Term) -> Term {
        for m in self.frames() {
            if f.signature_depends_on(&m.indeterminates) {
                return m.clone_term(&Telescope::new(), f);
            }
        }
        f.clone()
    }
}

#[cfg(test)]
mod matcher_tests {
    use super::*;

    struct Fixture {
        typ: Term,
        nat: Term,
        zero: Term,
        succ: Term,
        p: Term,
    }

    fn decl(name: &str, params: Vec<Term>, typ: &Term) -> Term {
        let term = Term::declaration(Telescope::from(params), typ.clone());
        term.set_name(name);
        term
    }

    /// `Nat : Type`, `zero : Nat`, `succ (n : Nat) : Nat`, `P (n : Nat) : Type`
    fn fixture() -> Fixture {
        let typ = Term::universe();
        typ.set_name("Type");
        let nat = decl("Nat", vec![], &typ);
        let zero = decl("zero", vec![], &nat);
        let n = decl("n", vec![], &nat);
        let succ = decl("succ", vec![n], &nat);
        let m = decl("m", vec![], &nat);
        let p = decl("P", vec![m], &typ);
        Fixture { typ, nat, zero, succ, p }
    }

    #[test]
    fn identity_conversion() {
        let f = fixture();
        let matcher = Matcher::new(vec![]);
        let p_zero = f.p.apply(std::slice::from_ref(&f.zero)).unwrap();
        for term in [&f.typ, &f.nat, &f.zero, &f.succ, &f.p, &p_zero] {
            assert_eq!(&matcher.convert(term), term);
        }
    }

    #[test]
    fn reflexive_matching() {
        let f = fixture();
        let matcher = Matcher::new(vec![]);
        let one = f.succ.apply(std::slice::from_ref(&f.zero)).unwrap();
        for term in [&f.typ, &f.nat, &f.zero, &f.succ, &f.p, &one] {
            assert!(matcher.matches(term, term));
        }
    }

    #[test]
    fn solves_indeterminate() {
        let f = fixture();
        let x = decl("x", vec![], &f.nat);
        let matcher = Matcher::new(vec![x.clone()]);
        let p_x = f.p.apply(std::slice::from_ref(&x)).unwrap();
        let p_zero = f.p.apply(std::slice::from_ref(&f.zero)).unwrap();

        assert!(matcher.matches(&p_x, &p_zero));
        assert_eq!(matcher.get_solution(&x), Some(f.zero.clone()));
        assert!(matcher.solved());
        assert!(matcher.convert(&p_x).equivalent(&p_zero));
    }

    #[test]
    fn distinct_constants_do_not_match() {
        let f = fixture();
        let one = decl("one", vec![], &f.nat);
        let matcher = Matcher::new(vec![]);
        assert!(!matcher.matches(&f.zero, &one));
        assert!(!matcher.matches(&f.zero, &f.nat));
    }

    #[test]
    fn types_must_agree() {
        let f = fixture();
        let x = decl("x", vec![], &f.nat);
        let matcher = Matcher::new(vec![x.clone()]);
        // `Nat` is a type, not a natural number
        assert!(!matcher.matches(&x, &f.nat));
        assert!(matcher.get_solution(&x).is_none());
    }

    #[test]
    fn conflicting_solutions_are_rejected() {
        let f = fixture();
        let one = decl("one", vec![], &f.nat);
        let x = decl("x", vec![], &f.nat);
        let matcher = Matcher::new(vec![x.clone()]);
        assert!(matcher.put_solution(&x, &f.zero));
        assert!(matcher.put_solution(&x, &f.zero));
        assert!(!matcher.put_solution(&x, &one));
    }

    #[test]
    fn solutions_resolve_transitively() {
        let f = fixture();
        let x = decl("x", vec![], &f.nat);
        let y = decl("y", vec![], &f.nat);
        let matcher = Matcher::new(vec![x.clone(), y.clone()]);
        assert!(matcher.matches(&y, &x));
        assert!(matcher.matches(&y, &f.zero));
        assert_eq!(matcher.get_solution(&x), Some(f.zero.clone()));
        assert_eq!(matcher.get_solution(&y), Some(f.zero.clone()));
    }

    #[test]
    fn earlier_indeterminate_maps_to_later() {
        let f = fixture();
        let x = decl("x", vec![], &f.nat);
        let y = decl("y", vec![], &f.nat);
        let matcher = Matcher::new(vec![x.clone(), y.clone()]);
        assert!(matcher.matches(&x, &y));
        assert_eq!(matcher.get_solution(&x), Some(y.clone()));
        assert!(matcher.get_solution(&y).is_none());

        let matcher = Matcher::new(vec![x.clone(), y.clone()]);
        assert!(matcher.matches(&y, &x));
        assert_eq!(matcher.get_solution(&x), Some(y.clone()));
        assert!(matcher.get_solution(&y).is_none());
    }

    #[test]
    fn distinct_universes_do_not_match() {
        let f = fixture();
        let other = Term::universe();
        let matcher = Matcher::new(vec![]);
        assert!(!matcher.matches(&f.typ, &other));
        assert!(!matcher.matches(&f.nat, &f.typ));
        assert!(!matcher.matches(&f.typ, &f.nat));
    }

    #[test]
    fn sorts_of_different_levels_do_not_match() {
        let f = fixture();
        let prop = decl("Prop", vec![], &f.typ);
        let a = decl("a", vec![], &f.typ);
        let b = decl("b", vec![], &prop);
        let x = decl("x", vec![], &a);
        let matcher = Matcher::new(vec![x.clone()]);
        assert!(!matcher.matches(&prop, &f.typ));
        assert!(!matcher.matches(&x, &b));
        assert!(matcher.get_solution(&x).is_none());
    }

    #[test]
    fn child_scopes_see_ancestors() {
        let f = fixture();
        let x = decl("x", vec![], &f.nat);
        let outer = Matcher::new(vec![x.clone()]);
        {
            let inner = outer.child(vec![]);
            assert!(inner.is_indeterminate(&x));
            assert!(inner.matches(&x, &f.zero));
        }
        assert_eq!(outer.get_solution(&x), Some(f.zero.clone()));
    }

    #[test]
    fn has_solution_of_specializations() {
        let f = fixture();
        let x = decl("x", vec![], &f.nat);
        let matcher = Matcher::new(vec![x.clone()]);
        let succ_x = f.succ.apply(std::slice::from_ref(&x)).unwrap();
        assert!(matcher.has_solution(&f.zero));
        assert!(!matcher.has_solution(&succ_x));
        assert!(matcher.put_solution(&x, &f.zero));
        assert!(matcher.has_solution(&succ_x));
    }

    #[test]
    fn lambdas_match_up_to_renaming() {
        let f = fixture();
        let a = decl("a", vec![], &f.nat);
        let b = decl("b", vec![], &f.nat);
        let succ_a = f.succ.apply(std::slice::from_ref(&a)).unwrap();
        let succ_b = f.succ.apply(std::slice::from_ref(&b)).unwrap();
        let lam_a = succ_a.specialize(Telescope::from(vec![a]), &[]).unwrap();
        let lam_b = succ_b.specialize(Telescope::from(vec![b]), &[]).unwrap();
        assert!(lam_a.equivalent(&lam_b));
        assert!(!lam_a.equivalent(&f.succ.apply(std::slice::from_ref(&f.zero)).unwrap()));
    }

    #[test]
    fn clone_substitutes_dependencies() {
        // h : P x, with x := zero
        let f = fixture();
        let x = decl("x", vec![], &f.nat);
        let h = decl("h", vec![], &f.p.apply(std::slice::from_ref(&x)).unwrap());
        let matcher = Matcher::new(vec![x.clone()]);
        assert!(matcher.put_solution(&x, &f.zero));

        let clone = matcher.clone_term(&Telescope::new(), &h);
        assert_ne!(clone, h);
        assert_eq!(clone.name(), Some("h"));
        assert!(clone.typ().equivalent(&f.p.apply(std::slice::from_ref(&f.zero)).unwrap()));
    }

    #[test]
    fn cheap_clone_shares_independent_terms() {
        let f = fixture();
        let x = decl("x", vec![], &f.nat);
        let h = decl("h", vec![], &f.p.apply(std::slice::from_ref(&x)).unwrap());
        let matcher = Matcher::new(vec![x.clone()]);
        assert!(matcher.put_solution(&x, &f.zero));

        assert_eq!(matcher.cheap_clone(&f.zero), f.zero);
        let clone = matcher.cheap_clone(&h);
        assert_ne!(clone, h);
        assert!(clone.typ().equivalent(&f.p.apply(std::slice::from_ref(&f.zero)).unwrap()));
    }

    #[test]
    fn convert_rebuilds_changed_specializations() {
        let f = fixture();
        let x = decl("x", vec![], &f.nat);
        let succ_x = f.succ.apply(std::slice::from_ref(&x)).unwrap();
        let matcher = Matcher::new(vec![x.clone()]);
        assert!(matcher.put_solution(&x, &f.zero));

        let converted = matcher.convert(&succ_x);
        assert_eq!(converted.base(), &f.succ);
        assert_eq!(converted.arguments(), std::slice::from_ref(&f.zero));
        assert_eq!(converted.typ(), &f.nat);
    }

    #[test]
    fn renamed_clones_keep_their_dependencies() {
        // (x : Nat) (h : P x), cloned as a.x and a.h
        let f = fixture();
        let x = decl("x", vec![], &f.nat);
        let h = decl("h", vec![], &f.p.apply(std::slice::from_ref(&x)).unwrap());
        h.set_implicit(true);
        let tele = Telescope::from(vec![x.clone(), h.clone()]);

        let root = Matcher::new(vec![]);
        let (clones, _) = root.clone_telescope_renamed(&Telescope::new(), &tele, |term| {
            term.name().map(|name| format!("a.{name}"))
        });
        let [x_clone, h_clone] = clones.terms() else { panic!("expected two clones") };
        assert_eq!(x_clone.name(), Some("a.x"));
        assert_eq!(h_clone.name(), Some("a.h"));
        assert!(h_clone.implicit());
        assert_eq!(h_clone.typ().arguments(), std::slice::from_ref(x_clone));
    }
}
