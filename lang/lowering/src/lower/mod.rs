use std::rc::Rc;

use quarry_lang_kernel::{Telescope, Term};
use quarry_lang_miette_util::{Span, ToMiette};

use super::ctx::*;
use super::result::*;

mod decls;
mod exp;
mod params;

pub use params::lower_telescope;

pub trait Lower {
    type Target;

    fn lower(&self, ctx: &mut Ctx) -> LoweringResult<Self::Target>;
}

impl<T: Lower> Lower for Vec<T> {
    type Target = Vec<T::Target>;

    fn lower(&self, ctx: &mut Ctx) -> LoweringResult<Self::Target> {
        self.iter().map(|x| x.lower(ctx)).collect()
    }
}

impl<T: Lower> Lower for Rc<T> {
    type Target = T::Target;

    fn lower(&self, ctx: &mut Ctx) -> LoweringResult<Self::Target> {
        (**self).lower(ctx)
    }
}

/// Turn the parameters `params`, which `body` may refer to, into parameters of `body`.
fn abstract_over(body: Term, params: Telescope, span: Span) -> LoweringResult<Term> {
    if params.is_empty() {
        return Ok(body);
    }
    body.specialize(params, &[])
        .map_err(|inner| LoweringError::Specialization { inner, span: span.to_miette() }.into())
}
