use std::io::Write;
use std::time::Instant;

use log::info;

use quarry_lang_kernel::{HashMap, Telescope, Term};
use quarry_lang_lowering::{Lower, lower_telescope};
use quarry_lang_miette_util::ToMiette;
use quarry_lang_parser::cst::stmt::{Query, Search};
use quarry_lang_printer::tokens::{COMMA, EQ, UNNAMED};
use quarry_lang_printer::{PrintCfg, PrintToString};
use quarry_lang_search::Searcher;

use super::{ExecResult, Session};
use crate::options::MAX_SEARCH_RESULTS;
use crate::result::DriverError;

const NO_SOLUTIONS: &str = "no solutions found";

impl Session {
    /// `search N params` searches for up to `N` inhabitants of the telescope `params`.
    ///
    /// Independent groups of goals are searched separately and their results are zipped, so the
    /// number of results is the smallest number found for any group.
    pub(super) fn search(&mut self, search: &Search, out: &mut dyn Write) -> ExecResult {
        let max_results = search.max_results.unwrap_or(1).min(MAX_SEARCH_RESULTS);
        let goals = lower_telescope(&search.params, &mut self.ctx, |_, goals| Ok(goals))?;
        if !self.run_searches {
            return Ok(());
        }

        let options = self.options.search_options();
        let cfg = self.options.print_cfg();
        let start = Instant::now();
        let mut searcher = Searcher::new(self.index(), options);

        let mut solutions: Vec<HashMap<Term, Term>> = vec![HashMap::default(); max_results.max(1)];
        let mut found = solutions.len();
        let mut query_count = 0;
        for group in goals.split() {
            let success = searcher.search(&group, max_results);
            query_count += searcher.query_count();
            if !success {
                found = 0;
                break;
            }
            found = found.min(searcher.results().len());
            for (solution, result) in solutions.iter_mut().zip(searcher.results()) {
                solution.extend(group.iter().cloned().zip(result.iter().cloned()));
            }
        }
        info!("Search took {} ms (using {} queries)", start.elapsed().as_millis(), query_count);

        if found == 0 {
            writeln!(out, "{NO_SOLUTIONS}")?;
            return Ok(());
        }
        for solution in &solutions[..found] {
            let values: Vec<Term> = goals.iter().filter_map(|goal| solution.get(goal).cloned()).collect();
            writeln!(out, "{}", format_result(&goals, &values, &cfg))?;
        }
        Ok(())
    }

    /// `prove f` searches for a proof of the declaration `f` from its parameters.
    pub(super) fn prove(&mut self, query: &Query, out: &mut dyn Write) -> ExecResult {
        let thm = query.exp.lower(&mut self.ctx)?;
        if !thm.is_base() {
            return Err(DriverError::ProveExpectsBase { span: query.exp.span().to_miette() }.into());
        }
        if !self.run_searches {
            return Ok(());
        }

        let options = self.options.search_options();
        let cfg = self.options.print_cfg();
        let start = Instant::now();
        let mut searcher = Searcher::new(self.index(), options);
        let success = searcher.prove(&thm);
        info!(
            "Search took {} ms (using {} queries)",
            start.elapsed().as_millis(),
            searcher.query_count()
        );

        match searcher.result() {
            Some(proof) if success => {
                let goals = Telescope::from(vec![thm]);
                writeln!(out, "{}", format_result(&goals, proof, &cfg))?;
            }
            _ => writeln!(out, "{NO_SOLUTIONS}")?,
        }
        Ok(())
    }
}

/// `x = a, y = b` for the explicit goals `x` and `y`.
fn format_result(goals: &Telescope, values: &[Term], cfg: &PrintCfg) -> String {
    let assignments: Vec<String> = goals
        .iter()
        .zip(values)
        .filter(|(goal, _)| !goal.implicit())
        .map(|(goal, value)| {
            let name = goal.name().unwrap_or(UNNAMED);
            format!("{name} {EQ} {}", value.print_to_string(Some(cfg)))
        })
        .collect();
    assignments.join(&format!("{COMMA} "))
}
