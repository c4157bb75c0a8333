use log::debug;

use quarry_lang_kernel::HashSet;
use quarry_lang_lowering::Ctx;
use quarry_lang_search::{DEFAULT_PREFERENCE, Index};

use super::Session;

impl Session {
    /// The index of all theorems visible from the current namespace.
    pub(super) fn index(&mut self) -> &Index {
        if self.index.is_some() {
            debug!("Found search index in cache");
        }
        self.index.get_or_insert_with(|| build_index(&self.ctx))
    }
}

/// Collect the theorems of the current namespace, its ancestors and the open namespaces.
///
/// A theorem visible through several namespaces is only indexed once, with the preference of the
/// namespace it was first found in.
pub(crate) fn build_index(ctx: &Ctx) -> Index {
    let mut seen = HashSet::default();
    let mut theorems = Vec::new();
    for id in ctx.visible_namespaces() {
        let namespace = ctx.namespace(id);
        for thm in namespace.terms() {
            if seen.insert(thm.clone()) {
                let preference = namespace.preference(thm).unwrap_or(DEFAULT_PREFERENCE);
                theorems.push((thm.clone(), preference));
            }
        }
    }
    debug!("Recomputed search index with {} theorems", theorems.len());
    Index::new(theorems)
}
