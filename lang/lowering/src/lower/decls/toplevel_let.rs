use quarry_lang_kernel::Term;
use quarry_lang_miette_util::Span;
use quarry_lang_parser::cst;

use super::{Declared, lower_names};
use crate::ctx::Ctx;
use crate::lower::Lower;
use crate::result::LoweringResult;

impl Lower for cst::stmt::Let {
    type Target = Vec<Term>;

    /// Declare the names of the statement in the current namespace.
    fn lower(&self, ctx: &mut Ctx) -> LoweringResult<Self::Target> {
        let cst::stmt::Let { span, doc, preference, names, params, body } = self;

        let names: Vec<(String, Span)> =
            names.iter().map(|name| (name.to_string(), name.span)).collect();
        let declared = lower_names(&names, params, body, *span, true, ctx)?;

        let mut terms = Vec::with_capacity(declared.len());
        for Declared { name, span, term } in declared {
            ctx.bind(&name, span, &term)?;
            if let Some(preference) = preference {
                ctx.set_preference(&term, *preference);
            }
            terms.push(term);
        }

        if let Some(doc) = doc {
            for (name, _) in &names {
                ctx.set_documentation(name, doc.text());
            }
        }
        Ok(terms)
    }
}
