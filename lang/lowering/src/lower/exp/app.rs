use quarry_lang_kernel::{Telescope, Term};
use quarry_lang_miette_util::ToMiette;
use quarry_lang_parser::cst;

use crate::{Ctx, LoweringError, LoweringResult, lower::Lower};

impl Lower for cst::exp::App {
    type Target = Term;

    /// The arguments are given to the explicit parameters of the function in order,
    /// implicit parameters in between are inferred.
    fn lower(&self, ctx: &mut Ctx) -> LoweringResult<Self::Target> {
        let cst::exp::App { span, fun, args } = self;

        let fun = fun.lower(ctx)?;
        let mut trailing = args.lower(ctx)?.into_iter().peekable();

        let mut arguments = Vec::with_capacity(fun.params().len());
        for param in fun.params() {
            if trailing.peek().is_none() {
                break;
            }
            if param.implicit() {
                arguments.push(None);
            } else {
                arguments.push(trailing.next());
            }
        }
        if trailing.next().is_some() {
            return Err(LoweringError::TooManyArguments {
                fun: fun.to_string(),
                expected: fun.explicit_params().len(),
                actual: args.len(),
                span: span.to_miette(),
            }
            .into());
        }

        fun.specialize(Telescope::new(), &arguments)
            .map_err(|inner| LoweringError::Specialization { inner, span: span.to_miette() }.into())
    }
}
