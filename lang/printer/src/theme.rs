use pretty::{
    DocAllocator,
    termcolor::{Color, ColorSpec},
};

use super::types::*;

const CTOR: Color = Color::Blue;
const TYPE: Color = Color::Red;

pub trait ThemeExt<'a> {
    fn ctor(&'a self, text: String) -> Builder<'a>;
    fn typ(&'a self, text: String) -> Builder<'a>;
}

impl<'a> ThemeExt<'a> for Alloc<'a> {
    fn ctor(&'a self, text: String) -> Builder<'a> {
        self.text(text).annotate(CTOR.spec())
    }

    fn typ(&'a self, text: String) -> Builder<'a> {
        self.text(text).annotate(TYPE.spec())
    }
}

pub trait ColorExt {
    fn spec(self) -> ColorSpec;
}

impl ColorExt for Color {
    fn spec(self) -> ColorSpec {
        ColorSpec::new().set_fg(Some(self)).clone()
    }
}
