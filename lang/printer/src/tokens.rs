//! This module contains the symbols of the surface language.
//! These constants are used when we prettyprint terms and search results.

// Symbols
//
//

/// The symbol `,`
pub const COMMA: &str = ",";

/// The symbol `:`
pub const COLON: &str = ":";

/// The symbol `:=`
pub const COLONEQ: &str = ":=";

/// The symbol `.`
pub const DOT: &str = ".";

/// The symbol `=`
pub const EQ: &str = "=";

/// The symbol `?`, printed for terms without a name
pub const UNNAMED: &str = "?";

/// The symbol `λ`
pub const LAMBDA: &str = "λ";

