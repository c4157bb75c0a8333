use quarry_lang_miette_util::Span;

pub fn span(l: usize, r: usize) -> Span {
    Span::new(l, r)
}
