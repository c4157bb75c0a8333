use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, trace};
use quarry_lang_kernel::{Telescope, Term};

use crate::index::Index;
use crate::query::Query;
use crate::thread_manager::{ThreadManager, Worker};

#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Queries whose deepest goal lies at this depth are not explored any further.
    pub max_depth: usize,
    pub max_threads: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions { max_depth: 5, max_threads: 1 }
    }
}

/// Breadth-first proof search over the theorems of an [Index].
pub struct Searcher<'i> {
    index: &'i Index,
    options: SearchOptions,
    results: Vec<Vec<Term>>,
    query_count: usize,
}

impl<'i> Searcher<'i> {
    pub fn new(index: &'i Index, options: SearchOptions) -> Self {
        Searcher { index, options, results: Vec::new(), query_count: 0 }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Search for up to `max_results` distinct inhabitants of the telescope `goals`.
    ///
    /// Returns whether at least one was found.
    pub fn search(&mut self, goals: &Telescope, max_results: usize) -> bool {
        self.run(goals, max_results.max(1), None)
    }

    /// Search for an inhabitant of the type of the declaration `f`, abstracted over its
    /// parameters, without using `f` itself.
    pub fn prove(&mut self, f: &Term) -> bool {
        self.run(&Telescope::from(vec![f.clone()]), 1, Some(f))
    }

    /// The first result of the last search.
    pub fn result(&self) -> Option<&[Term]> {
        self.results.first().map(Vec::as_slice)
    }

    /// All results of the last search, in the order they were found.
    pub fn results(&self) -> &[Vec<Term>] {
        &self.results
    }

    /// The number of queries that were explored by the last search.
    pub fn query_count(&self) -> usize {
        self.query_count
    }

    fn run(&mut self, goals: &Telescope, max_results: usize, excluded: Option<&Term>) -> bool {
        self.results.clear();
        self.query_count = 0;

        if goals.is_empty() {
            self.results.push(Vec::new());
            return true;
        }

        let state = SearchState {
            index: self.index,
            excluded,
            max_depth: self.options.max_depth,
            max_results,
            queues: Mutex::new(vec![VecDeque::new(); self.options.max_depth.max(1)]),
            results: Mutex::new(Vec::new()),
            query_count: AtomicUsize::new(0),
        };
        state.lock_queues()[0].push_back(Query::initial(goals));

        ThreadManager::new(self.options.max_threads).run(|worker| state.explore(worker));

        self.query_count = state.query_count.load(Ordering::SeqCst);
        self.results = state.results.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        debug!("found {} result(s) using {} queries", self.results.len(), self.query_count);
        !self.results.is_empty()
    }
}

/// Everything the workers of a single search share.
struct SearchState<'s> {
    index: &'s Index,
    excluded: Option<&'s Term>,
    max_depth: usize,
    max_results: usize,
    /// One first-in first-out queue per depth.
    queues: Mutex<Vec<VecDeque<Arc<Query>>>>,
    results: Mutex<Vec<Vec<Term>>>,
    query_count: AtomicUsize,
}

impl SearchState<'_> {
    fn lock_queues(&self) -> MutexGuard<'_, Vec<VecDeque<Arc<Query>>>> {
        self.queues.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The shallowest query that is waiting.
    fn pop(&self) -> Option<Arc<Query>> {
        self.lock_queues().iter_mut().find_map(VecDeque::pop_front)
    }

    fn explore(&self, worker: &Worker<'_>) {
        while !worker.is_cancelled() {
            let Some(query) = self.pop() else {
                if worker.wait_for_update() {
                    continue;
                }
                break;
            };
            self.query_count.fetch_add(1, Ordering::SeqCst);

            let query = query.normalize();
            if self.is_redundant(&query) {
                trace!("skipping a redundant query at depth {}", query.depth());
                continue;
            }

            let Some(goal) = query.goal() else {
                continue;
            };
            let goal_base = goal.typ().base();
            let (theorems, generic) = if query.indeterminates().contains(goal_base) {
                (self.index.all(), &[][..])
            } else {
                (self.index.theorems(goal_base), self.index.generic())
            };

            let mut reductions = Vec::new();
            let mut done = false;
            for thm in query.locals().iter().chain(theorems).chain(generic) {
                if self.excluded == Some(thm) {
                    continue;
                }
                let Some(sub) = query.reduce(thm) else {
                    continue;
                };
                if sub.solved() {
                    if self.record(&sub) {
                        done = true;
                        break;
                    }
                } else if sub.depth() < self.max_depth {
                    reductions.push(sub);
                }
            }

            if done {
                worker.send_permanent_update();
                break;
            }
            if reductions.is_empty() {
                continue;
            }

            // Queries with fewer open goals first
            reductions.sort_by_key(|sub| sub.indeterminates().len());
            {
                let mut queues = self.lock_queues();
                for sub in reductions {
                    let depth = sub.depth();
                    queues[depth].push_back(sub);
                }
            }
            worker.send_update();
        }
    }

    /// Whether some ancestor of `query` is already at least as good.
    fn is_redundant(&self, query: &Query) -> bool {
        std::iter::successors(query.parent(), |p| p.parent()).any(|p| p.injects_into(query))
    }

    /// Store the solutions of a solved query, unless they were found before.
    ///
    /// Returns whether enough results have been found.
    fn record(&self, query: &Query) -> bool {
        let solutions = query.final_solutions();
        let mut results = self.results.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if results.len() >= self.max_results {
            return true;
        }
        let known = results.iter().any(|result| {
            result.len() == solutions.len()
                && result.iter().zip(&solutions).all(|(lhs, rhs)| lhs.equivalent(rhs))
        });
        if !known {
            results.push(solutions);
        }
        results.len() >= self.max_results
    }
}
