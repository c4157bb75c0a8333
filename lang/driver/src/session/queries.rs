use std::io::Write;

use quarry_lang_kernel::PrintDefinition;
use quarry_lang_lowering::Lower;
use quarry_lang_parser::cst::stmt::Query;
use quarry_lang_printer::PrintToString;

use super::{ExecResult, Session};

impl Session {
    /// `check e` prints the definition of `e`, followed by its type if `e` is not a declaration.
    pub(super) fn check_query(&mut self, query: &Query, out: &mut dyn Write) -> ExecResult {
        let term = query.exp.lower(&mut self.ctx)?;
        let cfg = self.options.print_cfg();
        let mut line = term.definition().print_to_string(Some(&cfg));
        if !term.is_base() {
            line.push_str(" : ");
            line.push_str(&term.typ().print_to_string(Some(&cfg)));
        }
        writeln!(out, "{line}")?;
        Ok(())
    }

    /// `docs e` prints the documentation attached to the declaration of `e`.
    pub(super) fn docs(&mut self, query: &Query, out: &mut dyn Write) -> ExecResult {
        let term = query.exp.lower(&mut self.ctx)?;
        let docs = self.ctx.documentation(&term).unwrap_or("No documentation");
        writeln!(out, "{docs}")?;
        Ok(())
    }
}
