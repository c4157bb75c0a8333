use quarry_lang_kernel::Term;
use quarry_lang_parser::cst;

use super::Lower;
use crate::ctx::*;
use crate::result::*;

mod app;
mod lam;
mod struct_lit;

pub(crate) use struct_lit::lower_struct_lit;

impl Lower for cst::exp::Exp {
    type Target = Term;

    fn lower(&self, ctx: &mut Ctx) -> LoweringResult<Self::Target> {
        match self {
            cst::exp::Exp::Var(path) => ctx.lookup(path),
            cst::exp::Exp::App(e) => e.lower(ctx),
            cst::exp::Exp::Lam(e) => e.lower(ctx),
            cst::exp::Exp::StructLit(e) => e.lower(ctx),
        }
    }
}
