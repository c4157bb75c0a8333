/// Extension of quarry source files.
pub const FILE_EXTENSION: &str = "qry";

