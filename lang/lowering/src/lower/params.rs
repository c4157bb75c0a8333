use quarry_lang_kernel::{Matcher, PrintDefinition, Telescope, Term};
use quarry_lang_miette_util::{Span, ToMiette};
use quarry_lang_parser::cst;
use quarry_lang_parser::cst::exp::Body;

use super::decls::{Declared, lower_binding};
use crate::ctx::Ctx;
use crate::result::{LoweringError, LoweringResult};

/// Lower a parameter list
///
/// Execute a function `f` in a new local scope where all parameters are bound by their names.
/// The scope is left again when `f` returns.
pub fn lower_telescope<T, F>(params: &[cst::exp::Param], ctx: &mut Ctx, f: F) -> LoweringResult<T>
where
    F: FnOnce(&mut Ctx, Telescope) -> LoweringResult<T>,
{
    ctx.push_scope();
    let result = lower_params(params.iter().map(|param| (param.implicit, &param.binding)), ctx)
        .and_then(|telescope| f(ctx, telescope));
    ctx.pop_scope();
    result
}

/// Lower `bindings` into the innermost local scope and collect the declared parameters.
///
/// Definitions `x := e` among the bindings are bound by name but are not parameters.
pub(crate) fn lower_params<'b, I>(bindings: I, ctx: &mut Ctx) -> LoweringResult<Telescope>
where
    I: IntoIterator<Item = (bool, &'b cst::exp::Binding)>,
{
    let mut params = Vec::new();
    let mut implicits = Vec::new();
    for (implicit, binding) in bindings {
        let is_declaration = matches!(binding.body, Body::Type(_));
        for Declared { name, span, term } in lower_binding(binding, ctx)? {
            ctx.bind(&name, span, &term)?;
            if !is_declaration {
                continue;
            }
            if implicit {
                term.set_implicit(true);
            }
            if term.implicit() {
                implicits.push((term.clone(), binding.span));
            }
            params.push(term);
        }
    }
    reorder_implicits(Telescope::from(params), implicits)
}

/// Move every implicit parameter directly in front of the first explicit parameter from which
/// it can be inferred.
fn reorder_implicits(
    telescope: Telescope,
    mut pending: Vec<(Term, Span)>,
) -> LoweringResult<Telescope> {
    if pending.is_empty() {
        return Ok(telescope);
    }

    // Matching every parameter against a copy of itself tells which implicits it determines
    let root = Matcher::new(vec![]);
    let (copy, _) = root.clone_telescope(&Telescope::new(), &telescope);
    let matcher = Matcher::new(telescope.terms().to_vec());

    let mut reordered = Telescope::new();
    for (param, clone) in telescope.iter().zip(copy.iter()) {
        if param.implicit() {
            continue;
        }
        matcher.assert_matches(param, clone);
        let (ready, rest): (Vec<_>, Vec<_>) =
            pending.into_iter().partition(|(implicit, _)| matcher.has_solution(implicit));
        pending = rest;
        for (implicit, _) in ready {
            reordered.push(implicit);
        }
        reordered.push(param.clone());
    }

    match pending.first() {
        Some((implicit, span)) => Err(LoweringError::ImplicitNotInferable {
            param: implicit.print_definition_to_string(),
            span: span.to_miette(),
        }
        .into()),
        None => Ok(reordered),
    }
}
