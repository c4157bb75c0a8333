use pretty::DocAllocator;

use super::types::*;

pub trait ParensIfExt<'a, D, A: 'a>
where
    D: ?Sized + DocAllocator<'a, A>,
{
    fn parens_if(self, cond: bool) -> pretty::DocBuilder<'a, D, A>;
}

impl<'a, D, A> ParensIfExt<'a, D, A> for pretty::DocBuilder<'a, D, A>
where
    D: ?Sized + DocAllocator<'a, A>,
{
    fn parens_if(self, cond: bool) -> pretty::DocBuilder<'a, D, A> {
        if cond { self.parens() } else { self }
    }
}

/// Separate `docs` by `sep` followed by a line break that becomes a space when the group fits.
pub fn sep_line<'a, I>(alloc: &'a Alloc<'a>, docs: I, sep: &'a str) -> Builder<'a>
where
    I: IntoIterator<Item = Builder<'a>>,
{
    alloc.intersperse(docs, alloc.text(sep).append(alloc.line()))
}
