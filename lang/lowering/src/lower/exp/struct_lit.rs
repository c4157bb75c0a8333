use quarry_lang_kernel::{PrintDefinition, Telescope, Term};
use quarry_lang_miette_util::{Span, ToMiette};
use quarry_lang_parser::cst;
use quarry_lang_parser::cst::exp::Body;

use crate::lower::Lower;
use crate::lower::decls::{Declared, lower_binding};
use crate::{Ctx, LoweringError, LoweringResult};

impl Lower for cst::exp::StructLit {
    type Target = Term;

    fn lower(&self, ctx: &mut Ctx) -> LoweringResult<Self::Target> {
        lower_struct_lit(self, ctx).map(|(term, _)| term)
    }
}

/// Lower `S args { x := .., y := .. }` to the constructor of `S args` applied to the fields.
///
/// Also returns the value of every field by name.
pub(crate) fn lower_struct_lit(
    lit: &cst::exp::StructLit,
    ctx: &mut Ctx,
) -> LoweringResult<(Term, Vec<(String, Term)>)> {
    let cst::exp::StructLit { span, exp, fields } = lit;

    let structure = exp.lower(ctx)?;
    let Some(constructor) = structure.constructor().cloned() else {
        return Err(LoweringError::NoConstructor {
            term: structure.print_definition_to_string(),
            span: exp.span().to_miette(),
        }
        .into());
    };

    // Later fields may refer to earlier ones
    ctx.push_scope();
    let values = lower_values(fields, ctx);
    ctx.pop_scope();
    let values = values?;

    for (name, span, _) in &values {
        if constructor.params().iter().all(|param| param.name() != Some(name.as_str())) {
            return Err(LoweringError::UnknownField {
                name: name.clone(),
                structure: structure.to_string(),
                span: span.to_miette(),
            }
            .into());
        }
    }

    let mut assigned = Vec::with_capacity(constructor.params().len());
    for param in constructor.params() {
        let Some(name) = param.name() else {
            return Err(LoweringError::Impossible {
                message: format!("constructor {constructor} has an unnamed field"),
                span: Some(span.to_miette()),
            }
            .into());
        };
        let Some((_, _, value)) = values.iter().find(|(field, _, _)| field == name) else {
            return Err(
                LoweringError::MissingField { name: name.to_owned(), span: span.to_miette() }.into()
            );
        };
        assigned.push((name.to_owned(), value.clone()));
    }

    let args: Vec<Option<Term>> = assigned.iter().map(|(_, value)| Some(value.clone())).collect();
    let term = constructor
        .specialize(Telescope::new(), &args)
        .map_err(|inner| LoweringError::Specialization { inner, span: span.to_miette() })?;
    Ok((term, assigned))
}

fn lower_values(
    fields: &[cst::exp::Binding],
    ctx: &mut Ctx,
) -> LoweringResult<Vec<(String, Span, Term)>> {
    let mut values = Vec::with_capacity(fields.len());
    for binding in fields {
        if let Body::Type(_) = binding.body {
            let name = binding.names.first().map(|name| name.id.clone()).unwrap_or_default();
            return Err(
                LoweringError::FieldWithoutValue { name, span: binding.span.to_miette() }.into()
            );
        }
        for Declared { name, span, term } in lower_binding(binding, ctx)? {
            ctx.bind(&name, span, &term)?;
            values.push((name, span, term));
        }
    }
    Ok(values)
}
