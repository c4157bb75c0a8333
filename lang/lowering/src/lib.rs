//! Name resolution and lowering of the concrete syntax tree into kernel terms.
//!
//! The [Ctx] holds the namespace tree of a session. Declarations are lowered one statement at a
//! time, so that every statement can refer to everything declared before it.

mod ctx;
mod lower;
mod namespace;
mod result;

pub use ctx::{Ctx, FilePosition};
pub use lower::{Lower, lower_telescope};
pub use namespace::{Namespace, NamespaceId};
pub use result::*;
