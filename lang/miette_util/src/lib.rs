pub mod span;

pub use span::{LineCol, Span};

pub trait ToMiette {
    type Target;

    fn to_miette(self) -> Self::Target;
}

pub trait FromMiette {
    type Target;

    #[allow(clippy::wrong_self_convention)]
    fn from_miette(self) -> Self::Target;
}

impl ToMiette for Span {
    type Target = miette::SourceSpan;

    fn to_miette(self) -> Self::Target {
        miette::SourceSpan::new(self.start().into(), self.len())
    }
}

impl<T: ToMiette> ToMiette for Option<T> {
    type Target = Option<T::Target>;

    fn to_miette(self) -> Self::Target {
        self.map(ToMiette::to_miette)
    }
}

impl FromMiette for miette::SourceSpan {
    type Target = Span;

    fn from_miette(self) -> Self::Target {
        Span::new(self.offset(), self.offset() + self.len())
    }
}
