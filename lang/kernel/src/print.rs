use quarry_lang_printer::theme::ThemeExt;
use quarry_lang_printer::tokens::*;
use quarry_lang_printer::util::{ParensIfExt, sep_line};
use quarry_lang_printer::{Alloc, Builder, DocAllocator, PREC_ARG, Precedence, Print, PrintCfg};
use quarry_lang_printer::PrintToString;

use crate::matcher::Matcher;
use crate::telescope::Telescope;
use crate::term::Term;

impl<'a> Print<'a> for Term {
    fn print_prec(&'a self, cfg: &PrintCfg, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        if self.is_base() {
            return print_name(self, cfg, alloc);
        }
        if self.params().is_empty() {
            return print_expression(self, cfg, alloc, prec);
        }
        if self.name().is_some() {
            return print_name(self, cfg, alloc);
        }
        print_full(self, cfg, alloc).parens_if(prec > 0)
    }
}

/// Parameters are printed in groups of consecutive parameters with the same signature.
impl<'a> Print<'a> for Telescope {
    fn print(&'a self, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
        let terms = self.terms();
        let mut groups = Vec::new();
        let mut start = 0;
        while start < terms.len() {
            let first = &terms[start];
            let mut end = start + 1;
            while end < terms.len() {
                let other = &terms[end];
                if other.implicit() != first.implicit()
                    || !Matcher::new(vec![first.clone()]).matches(first, other)
                {
                    break;
                }
                end += 1;
            }

            let names = terms[start..end - 1].iter().map(|term| print_name(term, cfg, alloc));
            let last = print_full(&terms[end - 1], cfg, alloc);
            let group = alloc.intersperse(names.chain(std::iter::once(last)), alloc.space());
            groups.push(if first.implicit() { group.braces() } else { group.parens() });
            start = end;
        }
        alloc.intersperse(groups, alloc.space())
    }
}

/// The full definition of a term: its parameters together with its type, its fields or its body.
pub struct Definition<'t>(pub &'t Term);

impl<'a> Print<'a> for Definition<'_> {
    fn print(&'a self, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
        print_full(self.0, cfg, alloc)
    }
}

pub trait PrintDefinition {
    fn definition(&self) -> Definition<'_>;

    fn print_definition_to_string(&self) -> String {
        self.definition().print_to_string(None)
    }
}

impl PrintDefinition for Term {
    fn definition(&self) -> Definition<'_> {
        Definition(self)
    }
}

fn print_name<'a>(term: &'a Term, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
    let name = term.name().unwrap_or(UNNAMED);
    let text = match term.namespace() {
        Some(path) if cfg.show_namespaces && !path.is_empty() => format!("{path}{DOT}{name}"),
        _ => name.to_owned(),
    };
    if term.is_universe() || term.typ().is_universe() {
        alloc.typ(text)
    } else if term.is_base() && term.params().is_empty() && term.typ().constructor().is_none() {
        alloc.text(text)
    } else {
        alloc.ctor(text)
    }
}

/// `base arg1 arg2 ..`, leaving out arguments to implicit parameters.
fn print_expression<'a>(
    term: &'a Term,
    cfg: &PrintCfg,
    alloc: &'a Alloc<'a>,
    prec: Precedence,
) -> Builder<'a> {
    if term.is_base() {
        return print_name(term, cfg, alloc);
    }
    let base = term.base();
    let args: Vec<_> = base
        .params()
        .iter()
        .zip(term.arguments())
        .filter(|(param, _)| cfg.show_implicits || !param.implicit())
        .map(|(_, arg)| arg.print_prec(cfg, alloc, PREC_ARG))
        .collect();
    if args.is_empty() {
        return base.print_prec(cfg, alloc, prec);
    }
    let head = base.print_prec(cfg, alloc, PREC_ARG);
    head.append(alloc.space())
        .append(alloc.intersperse(args, alloc.space()))
        .group()
        .parens_if(prec > 0)
}

fn print_full<'a>(term: &'a Term, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
    if !term.is_base() && term.name().is_none() && term.params().is_empty() {
        return print_expression(term, cfg, alloc, 0);
    }
    let head = if term.is_base() {
        print_name(term, cfg, alloc)
    } else {
        match term.name() {
            Some(_) => print_name(term, cfg, alloc),
            None => alloc.text(LAMBDA),
        }
    };
    let head = if term.params().is_empty() {
        head
    } else {
        head.append(alloc.space()).append(term.params().print(cfg, alloc))
    };

    if !term.is_base() {
        return head
            .append(alloc.space())
            .append(COLONEQ)
            .append(alloc.space())
            .append(print_expression(term, cfg, alloc, 0));
    }

    match term.constructor() {
        Some(ctor) => {
            let fields = ctor.params().terms()[term.params().len()..]
                .iter()
                .map(|field| print_full(field, cfg, alloc));
            let fields = sep_line(alloc, fields, COMMA).group();
            head.append(alloc.space())
                .append(COLONEQ)
                .append(alloc.space())
                .append(fields.enclose("{ ", " }"))
        }
        None => head
            .append(alloc.space())
            .append(COLON)
            .append(alloc.space())
            .append(term.typ().print(cfg, alloc)),
    }
}
