use quarry_lang_kernel::{Matcher, Telescope, Term};
use quarry_lang_miette_util::{Span, ToMiette};
use quarry_lang_parser::cst;
use quarry_lang_parser::cst::exp::{Body, Exp};

use super::exp::lower_struct_lit;
use super::params::lower_telescope;
use super::{Lower, abstract_over};
use crate::ctx::Ctx;
use crate::result::{LoweringError, LoweringResult};

mod structure;
mod toplevel_let;

/// A name introduced by a binding, together with the term it stands for.
pub(crate) struct Declared {
    pub name: String,
    pub span: Span,
    pub term: Term,
}

/// Lower a binding inside parameters, structure fields or structure literals.
pub(crate) fn lower_binding(
    binding: &cst::exp::Binding,
    ctx: &mut Ctx,
) -> LoweringResult<Vec<Declared>> {
    let names: Vec<(String, Span)> =
        binding.names.iter().map(|name| (name.id.clone(), name.span)).collect();
    lower_names(&names, &binding.params, &binding.body, binding.span, false, ctx)
}

/// Lower `names params : T` or `name params := e`.
///
/// At the top level, declaring names of a structure type declares instances: the fields of the
/// structure become implicit terms named `name.field`, and likewise a definition by a structure
/// literal declares its field values as `name.field`.
fn lower_names(
    names: &[(String, Span)],
    params: &[cst::exp::Param],
    body: &Body,
    span: Span,
    toplevel: bool,
    ctx: &mut Ctx,
) -> LoweringResult<Vec<Declared>> {
    match body {
        Body::Type(typ) => lower_telescope(params, ctx, |ctx, params| {
            let typ_span = typ.span();
            let typ = typ.lower(ctx)?;
            if !ctx.is_sort(typ.typ()) {
                return Err(LoweringError::ExpectedTypeOrProp { span: typ_span.to_miette() }.into());
            }
            if !typ.params().is_empty() {
                return Err(LoweringError::TypeHasParameters { span: typ_span.to_miette() }.into());
            }

            let mut declared = Vec::with_capacity(names.len());
            for (name, name_span) in names {
                match typ.constructor() {
                    Some(constructor) if toplevel => {
                        declared.extend(instance(name, *name_span, &params, constructor)?)
                    }
                    _ => declared.push(Declared {
                        name: name.clone(),
                        span: *name_span,
                        term: Term::declaration(params.clone(), typ.clone()),
                    }),
                }
            }
            Ok(declared)
        }),
        Body::Value(exp) => {
            let [(name, name_span)] = names else {
                return Err(
                    LoweringError::MultipleNamesInDefinition { span: span.to_miette() }.into()
                );
            };
            lower_telescope(params, ctx, |ctx, params| {
                if let Exp::StructLit(lit) = &**exp {
                    if toplevel && params.is_empty() {
                        let (term, fields) = lower_struct_lit(lit, ctx)?;
                        let mut declared: Vec<Declared> = fields
                            .into_iter()
                            .map(|(field, value)| Declared {
                                name: format!("{name}.{field}"),
                                span: *name_span,
                                term: value,
                            })
                            .collect();
                        declared.push(Declared { name: name.clone(), span: *name_span, term });
                        return Ok(declared);
                    }
                }
                let body = exp.lower(ctx)?;
                let term = abstract_over(body, params, exp.span())?;
                Ok(vec![Declared { name: name.clone(), span: *name_span, term }])
            })
        }
    }
}

/// Declare `name` as a new instance of the structure with the given constructor.
fn instance(
    name: &str,
    span: Span,
    params: &Telescope,
    constructor: &Term,
) -> LoweringResult<Vec<Declared>> {
    let root = Matcher::new(vec![]);
    let (fields, sub) = root.clone_telescope_renamed(params, constructor.params(), |field| {
        field.name().map(|field| format!("{name}.{field}"))
    });
    let args: Vec<Option<Term>> = match &sub {
        Some(sub) => constructor.params().iter().map(|param| Some(sub.convert(param))).collect(),
        None => Vec::new(),
    };
    let term = constructor
        .specialize(params.clone(), &args)
        .map_err(|inner| LoweringError::Specialization { inner, span: span.to_miette() })?;

    let mut declared = Vec::with_capacity(fields.len() + 1);
    for field in fields {
        field.set_implicit(true);
        let field_name = field.name().map(str::to_owned).ok_or_else(|| {
            LoweringError::Impossible {
                message: format!("constructor of {name} has an unnamed field"),
                span: Some(span.to_miette()),
            }
        })?;
        declared.push(Declared { name: field_name, span, term: field });
    }
    declared.push(Declared { name: name.to_owned(), span, term });
    Ok(declared)
}
