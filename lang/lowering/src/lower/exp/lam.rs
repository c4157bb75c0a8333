use quarry_lang_kernel::Term;
use quarry_lang_parser::cst;

use crate::lower::{Lower, abstract_over, lower_telescope};
use crate::{Ctx, LoweringResult};

impl Lower for cst::exp::Lam {
    type Target = Term;

    fn lower(&self, ctx: &mut Ctx) -> LoweringResult<Self::Target> {
        let cst::exp::Lam { span, params, body } = self;
        lower_telescope(params, ctx, |ctx, params| {
            let body = body.lower(ctx)?;
            abstract_over(body, params, *span)
        })
    }
}
