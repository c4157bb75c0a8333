use std::sync::Arc;

use log::trace;
use quarry_lang_kernel::{HashMap, HashSet, Matcher, PrintDefinition, Telescope, Term};

/// A node of the search tree.
///
/// A query consists of indeterminates, the goals which still have to be inhabited, and the
/// locals, the hypotheses which were introduced by stripping the parameters of some goal.
/// The last indeterminate is the goal that will be worked on next.
///
/// Every query except the initial one knows how its indeterminates and locals relate to those of
/// its parent: `solutions` maps the indeterminates and locals of the parent to terms in the
/// language of this query.
#[derive(Debug)]
pub struct Query {
    parent: Option<Arc<Query>>,
    indeterminates: Vec<Term>,
    depths: Vec<usize>,
    solutions: HashMap<Term, Term>,
    locals: Vec<Term>,
    allowed_locals: HashMap<Term, Arc<HashSet<Term>>>,
}

enum Step {
    /// Depends on terms which are not mapped yet.
    Wait,
    /// Handled, with `Some(solution)` for indeterminates and parameters of the theorem.
    Mapped(Option<Term>),
    /// The reduction is impossible.
    Fail,
}

impl Query {
    /// The root query of a search for `goals`.
    pub fn initial(goals: &Telescope) -> Arc<Query> {
        Arc::new(Query {
            parent: None,
            indeterminates: goals.terms().to_vec(),
            depths: vec![0; goals.len()],
            solutions: HashMap::default(),
            locals: Vec::new(),
            allowed_locals: HashMap::default(),
        })
    }

    pub fn parent(&self) -> Option<&Arc<Query>> {
        self.parent.as_ref()
    }

    pub fn indeterminates(&self) -> &[Term] {
        &self.indeterminates
    }

    pub fn locals(&self) -> &[Term] {
        &self.locals
    }

    /// The goal that will be worked on next.
    pub fn goal(&self) -> Option<&Term> {
        self.indeterminates.last()
    }

    pub fn solved(&self) -> bool {
        self.indeterminates.is_empty()
    }

    /// The number of reductions that led to the deepest indeterminate of this query.
    pub fn depth(&self) -> usize {
        self.depths.iter().copied().max().unwrap_or(0)
    }

    /// Whether `solution` only mentions locals that are visible to the indeterminate `f`.
    pub fn is_allowed_solution(&self, f: &Term, solution: &Term) -> bool {
        if self.locals.is_empty() {
            return true;
        }
        let allowed = self.allowed_locals.get(f);
        let disallowed: Vec<Term> = self
            .locals
            .iter()
            .filter(|local| !allowed.is_some_and(|allowed| allowed.contains(*local)))
            .cloned()
            .collect();
        disallowed.is_empty() || !solution.depends_on(&disallowed)
    }

    /// Strip the parameters of the goal.
    ///
    /// A goal `h (x : A) : B` is replaced by a fresh goal `h' : B` and the parameters `x` become
    /// locals which only `h'` and the goals derived from it may use.
    /// A query whose goal has no parameters is returned as is.
    pub fn normalize(self: &Arc<Self>) -> Arc<Query> {
        let Some(h) = self.goal() else {
            return self.clone();
        };
        if h.params().is_empty() {
            return self.clone();
        }

        let new_h = Term::declaration(Telescope::new(), h.typ().clone());
        if let Some(name) = h.name() {
            new_h.set_name(name);
        }

        let mut indeterminates = self.indeterminates.clone();
        if let Some(last) = indeterminates.last_mut() {
            *last = new_h.clone();
        }

        let mut locals = self.locals.clone();
        locals.extend(h.params().iter().cloned());

        let mut allowed: HashSet<Term> =
            self.allowed_locals.get(h).map(|allowed| (**allowed).clone()).unwrap_or_default();
        allowed.extend(h.params().iter().cloned());
        let mut allowed_locals = self.allowed_locals.clone();
        allowed_locals.remove(h);
        allowed_locals.insert(new_h.clone(), Arc::new(allowed));

        let mut solutions = HashMap::default();
        solutions.insert(h.clone(), new_h);

        Arc::new(Query {
            parent: Some(self.clone()),
            indeterminates,
            depths: self.depths.clone(),
            solutions,
            locals,
            allowed_locals,
        })
    }

    /// Solve the goal by applying `thm`.
    ///
    /// The parameters of `thm` that are not determined by unifying its type with the type of the
    /// goal become new indeterminates of the resulting query, one level deeper than the goal.
    /// Returns `None` if the types do not unify, if `thm` is a local the goal may not use, or if
    /// the solution would mention locals out of scope.
    ///
    /// # Panics
    ///
    /// Panics if the query is not normalized.
    pub fn reduce(self: &Arc<Self>, thm: &Term) -> Option<Arc<Query>> {
        let h = self.goal()?;
        assert!(h.params().is_empty(), "only normalized queries can be reduced");

        let h_allowed = self.allowed_locals.get(h);
        if self.locals.contains(thm) && !h_allowed.is_some_and(|allowed| allowed.contains(thm)) {
            return None;
        }

        let thm_params = thm.params().terms();
        let mut indeterminates = self.indeterminates.clone();
        indeterminates.extend(thm_params.iter().cloned());
        let matcher = Matcher::new(indeterminates.clone());
        if !matcher.matches(h.typ(), thm.typ()) {
            return None;
        }

        // Everything except the goal is carried over to the new query
        let h_depth = self.depths.last().copied().unwrap_or(0);
        let mut mappable = indeterminates;
        if let Some(pos) = mappable.iter().position(|f| f == h) {
            mappable.remove(pos);
        }
        mappable.extend(self.locals.iter().cloned());
        let to_sub = Matcher::new(mappable.clone());
        let mut unmapped = mappable;

        let mut sub = Query {
            parent: Some(self.clone()),
            indeterminates: Vec::new(),
            depths: Vec::new(),
            solutions: HashMap::default(),
            locals: Vec::new(),
            allowed_locals: HashMap::default(),
        };
        let mut arguments: HashMap<Term, Term> = HashMap::default();

        'progress: while !unmapped.is_empty() {
            for idx in 0..unmapped.len() {
                let f = unmapped[idx].clone();

                let step = if let Some(i) = self.indeterminates.iter().position(|g| g == &f) {
                    match matcher.get_solution(&f) {
                        Some(solution) if solution.depends_on(&unmapped) => Step::Wait,
                        Some(solution) if !self.is_allowed_solution(&f, &solution) => Step::Fail,
                        Some(solution) => Step::Mapped(Some(to_sub.convert(&solution))),
                        None if f.signature_depends_on(&unmapped) => Step::Wait,
                        None => {
                            let clone = to_sub.cheap_clone(&f);
                            sub.indeterminates.push(clone.clone());
                            sub.depths.push(self.depths[i]);
                            if let Some(allowed) = self.allowed_locals.get(&f) {
                                sub.allowed_locals.insert(clone.clone(), allowed.clone());
                            }
                            Step::Mapped(Some(clone))
                        }
                    }
                } else if thm_params.contains(&f) {
                    match matcher.get_solution(&f) {
                        Some(argument) if argument.depends_on(&unmapped) => Step::Wait,
                        Some(argument) if !self.is_allowed_solution(h, &argument) => Step::Fail,
                        Some(argument) => Step::Mapped(Some(to_sub.convert(&argument))),
                        None if f.signature_depends_on(&unmapped) => Step::Wait,
                        None => {
                            let argument = to_sub.clone_term(&Telescope::new(), &f);
                            sub.indeterminates.push(argument.clone());
                            sub.depths.push(h_depth + 1);
                            if let Some(allowed) = h_allowed {
                                sub.allowed_locals.insert(argument.clone(), allowed.clone());
                            }
                            Step::Mapped(Some(argument))
                        }
                    }
                } else if self.locals.contains(&f) {
                    if f.signature_depends_on(&unmapped) {
                        Step::Wait
                    } else if f.signature_depends_on(std::slice::from_ref(h)) {
                        // Only meaningful while the goal is open
                        Step::Mapped(None)
                    } else {
                        let clone = to_sub.cheap_clone(&f);
                        sub.locals.push(clone.clone());
                        if clone != f {
                            sub.solutions.insert(f.clone(), clone.clone());
                        }
                        to_sub.assert_matches(&f, &clone);
                        Step::Mapped(None)
                    }
                } else {
                    unreachable!("{f:?} is neither an indeterminate, a parameter nor a local")
                };

                match step {
                    Step::Wait => continue,
                    Step::Fail => return None,
                    Step::Mapped(solution) => {
                        if let Some(solution) = solution {
                            to_sub.assert_matches(&f, &solution);
                            if thm_params.contains(&f) {
                                arguments.insert(f.clone(), solution);
                            } else if solution != f {
                                sub.solutions.insert(f.clone(), solution);
                            }
                        }
                        unmapped.remove(idx);
                        continue 'progress;
                    }
                }
            }
            // No term could be mapped, the dependencies are cyclic
            trace!("reduction with {} is stuck", thm.print_definition_to_string());
            return None;
        }

        for allowed in sub.allowed_locals.values_mut() {
            *allowed = Arc::new(allowed.iter().map(|local| to_sub.convert(local)).collect());
        }

        let args: Vec<Option<Term>> =
            thm_params.iter().map(|param| arguments.get(param).cloned()).collect();
        let solution = to_sub
            .convert(thm)
            .specialize(Telescope::new(), &args)
            .unwrap_or_else(|err| panic!("arguments for {thm:?} do not fit: {err}"));
        trace!("{} := {}", h.print_definition_to_string(), solution);
        sub.solutions.insert(h.clone(), solution);

        Some(Arc::new(sub))
    }

    /// The solutions for the indeterminates of the initial query, in their original order.
    ///
    /// # Panics
    ///
    /// Panics if this query is not solved.
    pub fn final_solutions(&self) -> Vec<Term> {
        assert!(self.solved(), "only solved queries have final solutions");
        let chain: Vec<&Query> =
            std::iter::successors(Some(self), |q| q.parent.as_deref())
                .filter(|q| q.parent.is_some())
                .collect();
        match chain.last() {
            None => self.indeterminates.clone(),
            Some(_) => Self::compose(&chain, None),
        }
    }

    /// Stack the solutions of `chain`, from the leaf towards the root, into one matcher.
    fn compose(chain: &[&Query], later: Option<&Matcher<'_>>) -> Vec<Term> {
        let Some((query, earlier)) = chain.split_first() else {
            unreachable!("the chain of a solved query is not empty");
        };
        let Some(parent) = query.parent.as_deref() else {
            unreachable!("only queries with a parent are composed");
        };

        let keys: Vec<Term> = query.solutions.keys().cloned().collect();
        let matcher = match later {
            Some(later) => later.child(keys),
            None => Matcher::new(keys),
        };
        for (f, g) in &query.solutions {
            let mut g = match later {
                // The type of a local may mention indeterminates, its value may not
                Some(later) if parent.locals.contains(f) => later.cheap_clone(g),
                Some(later) => later.convert(g),
                None => g.clone(),
            };
            if parent.goal() == Some(f) && !f.params().is_empty() {
                let params: Telescope = match later {
                    Some(later) => f.params().iter().map(|param| later.convert(param)).collect(),
                    None => f.params().clone(),
                };
                g = g
                    .specialize(params, &[])
                    .unwrap_or_else(|err| panic!("cannot abstract over {f:?}: {err}"));
            }
            matcher.assert_matches(f, &g);
        }

        if earlier.is_empty() {
            parent.indeterminates.iter().map(|f| matcher.convert(f)).collect()
        } else {
            Self::compose(earlier, Some(&matcher))
        }
    }

    /// Whether every indeterminate of this query can be mapped to a distinct indeterminate of
    /// `other`, such that every solution of `other` gives a solution of this query.
    pub fn injects_into(&self, other: &Query) -> bool {
        if self.indeterminates.len() > other.indeterminates.len() {
            return false;
        }

        let mut stack =
            vec![Trial::new(self.indeterminates.clone(), other.indeterminates.clone(), vec![], HashMap::default())];
        while let Some(trial) = stack.last_mut() {
            let Some(f) = trial.unmapped.last().cloned() else {
                return true;
            };
            if trial.candidates == 0 {
                stack.pop();
                continue;
            }
            trial.candidates -= 1;
            let g = trial.allowed[trial.candidates].clone();

            let known = Matcher::with_solutions(trial.mapped.clone(), trial.solutions.clone());
            let sub = known.child(trial.unmapped.clone());
            if !sub.matches(&f, &g) {
                continue;
            }

            let mut unmapped = Vec::new();
            let mut allowed = trial.allowed.clone();
            let mut valid = true;
            let mut abandon = false;
            for h in &trial.unmapped {
                match sub.get_solution(h) {
                    None if h == &f => {
                        abandon = true;
                        break;
                    }
                    None => unmapped.push(h.clone()),
                    Some(k) => match allowed.iter().position(|a| a == &k) {
                        Some(pos) => {
                            allowed.remove(pos);
                        }
                        None => {
                            valid = false;
                            break;
                        }
                    },
                }
            }
            if abandon {
                stack.pop();
                continue;
            }
            if !valid {
                continue;
            }

            let mut mapped = trial.mapped.clone();
            mapped.extend(trial.unmapped.iter().cloned());
            let mut solutions = known.solutions();
            solutions.extend(sub.solutions());
            stack.push(Trial::new(unmapped, allowed, mapped, solutions));
        }
        false
    }
}

/// One level of the backtracking in [Query::injects_into].
struct Trial {
    unmapped: Vec<Term>,
    allowed: Vec<Term>,
    /// Indeterminates of earlier levels.
    mapped: Vec<Term>,
    solutions: HashMap<Term, Term>,
    /// The candidates `allowed[..candidates]` are still to be tried, from the back.
    candidates: usize,
}

impl Trial {
    fn new(
        mut unmapped: Vec<Term>,
        mut allowed: Vec<Term>,
        mapped: Vec<Term>,
        solutions: HashMap<Term, Term>,
    ) -> Self {
        // A term shared by both sides is mapped to itself
        while let Some(f) = unmapped.last() {
            match allowed.iter().position(|g| g == f) {
                Some(pos) => {
                    allowed.remove(pos);
                    unmapped.pop();
                }
                None => break,
            }
        }
        let candidates = allowed.len();
        Trial { unmapped, allowed, mapped, solutions, candidates }
    }
}

#[cfg(test)]
mod query_tests {
    use super::*;
    use crate::fixtures::{Library, apply, decl};

    #[test]
    fn initial_query() {
        let lib = Library::new();
        let x = decl("x", vec![], &lib.nat);
        let query = Query::initial(&Telescope::from(vec![x.clone()]));
        assert_eq!(query.goal(), Some(&x));
        assert_eq!(query.depth(), 0);
        assert!(!query.solved());
        assert!(Query::initial(&Telescope::new()).solved());
    }

    #[test]
    fn reduce_with_constant() {
        let lib = Library::new();
        let x = decl("x", vec![], &lib.nat);
        let query = Query::initial(&Telescope::from(vec![x]));
        let sub = query.reduce(&lib.zero).unwrap();
        assert!(sub.solved());
        let solutions = sub.final_solutions();
        assert_eq!(solutions, vec![lib.zero.clone()]);
    }

    #[test]
    fn reduce_type_mismatch() {
        let lib = Library::new();
        let x = decl("x", vec![], &lib.nat);
        let query = Query::initial(&Telescope::from(vec![x]));
        assert!(query.reduce(&lib.p_zero).is_none());
    }

    #[test]
    fn reduce_introduces_parameters() {
        let lib = Library::new();
        let x = decl("x", vec![], &lib.nat);
        let query = Query::initial(&Telescope::from(vec![x]));
        let sub = query.reduce(&lib.succ).unwrap();
        assert_eq!(sub.indeterminates().len(), 1);
        assert_eq!(sub.depth(), 1);
        assert!(sub.goal().unwrap().typ() == &lib.nat);

        let leaf = sub.reduce(&lib.zero).unwrap();
        assert!(leaf.solved());
        let solution = &leaf.final_solutions()[0];
        assert!(solution.equivalent(&apply(&lib.succ, std::slice::from_ref(&lib.zero))));
    }

    #[test]
    fn reduce_infers_arguments() {
        // y : P zero, solved by p_succ needs P ?n with succ ?n = zero, which fails
        let lib = Library::new();
        let y = decl("y", vec![], &apply(&lib.p, std::slice::from_ref(&lib.zero)));
        let query = Query::initial(&Telescope::from(vec![y]));
        assert!(query.reduce(&lib.p_succ).is_none());

        // z : P (succ zero), solved by p_succ with n = zero and a new goal P zero
        let one = apply(&lib.succ, std::slice::from_ref(&lib.zero));
        let z = decl("z", vec![], &apply(&lib.p, &[one]));
        let query = Query::initial(&Telescope::from(vec![z]));
        let sub = query.reduce(&lib.p_succ).unwrap();
        assert_eq!(sub.indeterminates().len(), 1);
        let goal = sub.goal().unwrap();
        assert!(goal.typ().equivalent(&apply(&lib.p, std::slice::from_ref(&lib.zero))));

        let leaf = sub.reduce(&lib.p_zero).unwrap();
        let solution = &leaf.final_solutions()[0];
        assert_eq!(solution.to_string(), "p_succ zero p_zero");
    }

    #[test]
    fn normalize_introduces_locals() {
        // f (n : Nat) : Nat
        let lib = Library::new();
        let n = decl("n", vec![], &lib.nat);
        let f = decl("f", vec![n.clone()], &lib.nat);
        let query = Query::initial(&Telescope::from(vec![f.clone()]));
        let normalized = query.normalize();
        assert_eq!(normalized.locals(), &[n.clone()]);
        let goal = normalized.goal().unwrap();
        assert!(goal.params().is_empty());
        assert!(goal != &f);

        // The solution is abstracted over the local again
        let leaf = normalized.reduce(&n).unwrap();
        let solution = &leaf.final_solutions()[0];
        assert_eq!(solution.params().len(), 1);
        assert_eq!(solution.to_string(), "λ (n : Nat) := n");
    }

    #[test]
    fn normalize_is_idempotent() {
        let lib = Library::new();
        let n = decl("n", vec![], &lib.nat);
        let f = decl("f", vec![n], &lib.nat);
        let normalized = Query::initial(&Telescope::from(vec![f])).normalize();
        let again = normalized.normalize();
        assert!(Arc::ptr_eq(&normalized, &again));
    }

    #[test]
    fn locals_stay_in_scope() {
        // (a : Nat) (f (n : Nat) : Nat): f may use n, a may not
        let lib = Library::new();
        let a = decl("a", vec![], &lib.nat);
        let n = decl("n", vec![], &lib.nat);
        let f = decl("f", vec![n.clone()], &lib.nat);
        let query = Query::initial(&Telescope::from(vec![a, f])).normalize();
        let sub = query.reduce(&n).unwrap();
        assert_eq!(sub.indeterminates().len(), 1);
        assert!(sub.reduce(&n).is_none());
    }

    #[test]
    fn injects_into_itself() {
        let lib = Library::new();
        let x = decl("x", vec![], &lib.nat);
        let y = decl("y", vec![], &apply(&lib.p, std::slice::from_ref(&lib.zero)));
        let query = Query::initial(&Telescope::from(vec![x, y]));
        assert!(query.injects_into(&query));
    }

    #[test]
    fn injects_into_requires_matching_goals() {
        let lib = Library::new();
        let x = decl("x", vec![], &lib.nat);
        let y = decl("y", vec![], &apply(&lib.p, std::slice::from_ref(&lib.zero)));
        let small = Query::initial(&Telescope::from(vec![x.clone()]));
        let large = Query::initial(&Telescope::from(vec![decl("z", vec![], &lib.nat), y.clone()]));
        assert!(small.injects_into(&large));
        assert!(!large.injects_into(&small));

        let other = Query::initial(&Telescope::from(vec![y]));
        assert!(!small.injects_into(&other));
    }

    #[test]
    fn repeated_goal_is_detected() {
        // Applying succ to x : Nat yields a goal of the same shape
        let lib = Library::new();
        let x = decl("x", vec![], &lib.nat);
        let query = Query::initial(&Telescope::from(vec![x]));
        let sub = query.reduce(&lib.succ).unwrap();
        assert!(query.injects_into(&sub));
    }
}
