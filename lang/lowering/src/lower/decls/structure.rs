use quarry_lang_kernel::Term;
use quarry_lang_miette_util::ToMiette;
use quarry_lang_parser::cst;

use crate::ctx::Ctx;
use crate::lower::Lower;
use crate::lower::params::{lower_params, lower_telescope};
use crate::result::{LoweringError, LoweringResult};

impl Lower for cst::stmt::Structure {
    type Target = Term;

    /// `structure S params := { fields }` declares `S params : Type` together with the
    /// constructor `S.mk params fields : S params`.
    fn lower(&self, ctx: &mut Ctx) -> LoweringResult<Self::Target> {
        let cst::stmt::Structure { span, doc, name, params, fields } = self;

        let (structure, constructor) = lower_telescope(params, ctx, |ctx, params| {
            ctx.push_scope();
            let fields = lower_params(fields.iter().map(|field| (false, field)), ctx);
            ctx.pop_scope();
            let fields = fields?;

            let structure = Term::declaration(params.clone(), ctx.typ().clone());
            let typ = structure
                .apply(params.terms())
                .map_err(|inner| LoweringError::Specialization { inner, span: span.to_miette() })?;
            let constructor = Term::declaration(params + fields, typ);
            structure.set_constructor(constructor.clone());
            Ok((structure, constructor))
        })?;

        ctx.bind(&name.id, name.span, &structure)?;
        ctx.bind(&format!("{}.mk", name.id), name.span, &constructor)?;
        if let Some(doc) = doc {
            ctx.set_documentation(&name.id, doc.text());
        }
        Ok(structure)
    }
}
