use log::trace;
use quarry_lang_kernel::{HashMap, Telescope, Term};
use quarry_lang_miette_util::{Span, ToMiette};
use quarry_lang_parser::cst::Path;
use quarry_lang_parser::cst::ident::Ident;
use quarry_lang_parser::cst::stmt::NsPath;

use crate::namespace::{Namespace, NamespaceId};
use crate::result::{LoweringError, LoweringResult};

/// The state of name resolution, shared by every file of a session.
pub struct Ctx {
    /// All namespaces; the root is at index 0
    namespaces: Vec<Namespace>,
    current: NamespaceId,
    /// Open namespaces in the order they were opened
    open: Vec<NamespaceId>,
    /// Local binders: parameters, lambda binders, structure fields.
    /// The last scope is the innermost one.
    scopes: Vec<HashMap<String, Term>>,
    typ: Term,
    prop: Term,
}

/// The namespace state of a file, saved while an imported file is lowered.
pub struct FilePosition {
    current: NamespaceId,
    open: Vec<NamespaceId>,
}

impl Default for Ctx {
    fn default() -> Self {
        Self::new()
    }
}

impl Ctx {
    /// A fresh context where only the sorts `Type` and `Prop` are defined.
    ///
    /// `Type` is the universe, `Prop` is an ordinary declaration `Prop : Type`.
    pub fn new() -> Self {
        let typ = Term::universe();
        let prop = Term::declaration(Telescope::new(), typ.clone());
        let mut root = Namespace::new(String::new(), None);
        for (name, sort) in [("Type", &typ), ("Prop", &prop)] {
            sort.set_name(name);
            sort.set_namespace("");
            root.put(name.to_owned(), sort.clone());
        }
        Ctx {
            namespaces: vec![root],
            current: NamespaceId(0),
            open: Vec::new(),
            scopes: Vec::new(),
            typ,
            prop,
        }
    }

    pub fn typ(&self) -> &Term {
        &self.typ
    }

    pub fn prop(&self) -> &Term {
        &self.prop
    }

    /// Whether `term` is one of the sorts `Type` and `Prop`.
    pub fn is_sort(&self, term: &Term) -> bool {
        term == &self.typ || term == &self.prop
    }

    pub fn root(&self) -> NamespaceId {
        NamespaceId(0)
    }

    pub fn current(&self) -> NamespaceId {
        self.current
    }

    pub fn namespace(&self, id: NamespaceId) -> &Namespace {
        &self.namespaces[id.0]
    }

    fn namespace_mut(&mut self, id: NamespaceId) -> &mut Namespace {
        &mut self.namespaces[id.0]
    }

    pub fn open_namespaces(&self) -> &[NamespaceId] {
        &self.open
    }

    /// `id` followed by its parents up to the root.
    pub fn ancestors(&self, id: NamespaceId) -> impl Iterator<Item = NamespaceId> + '_ {
        std::iter::successors(Some(id), |id| self.namespace(*id).parent())
    }

    /// The namespaces whose terms may be used by a search: the current namespace, its
    /// ancestors, and every open namespace.
    pub fn visible_namespaces(&self) -> Vec<NamespaceId> {
        let mut visible: Vec<NamespaceId> = self.ancestors(self.current).collect();
        for id in &self.open {
            if !visible.contains(id) {
                visible.push(*id);
            }
        }
        visible
    }

    pub fn find_namespace(&self, from: NamespaceId, path: &[Ident]) -> Option<NamespaceId> {
        path.iter().try_fold(from, |id, segment| self.namespace(id).child(&segment.id))
    }

    /// Like [Ctx::find_namespace], creating missing namespaces on the way.
    fn subspace(&mut self, from: NamespaceId, path: &[Ident]) -> NamespaceId {
        let mut id = from;
        for segment in path {
            id = match self.namespace(id).child(&segment.id) {
                Some(child) => child,
                None => {
                    let child = NamespaceId(self.namespaces.len());
                    let full_path = self.namespace(id).qualify(&segment.id);
                    self.namespaces.push(Namespace::new(full_path, Some(id)));
                    self.namespace_mut(id).add_child(segment.id.clone(), child);
                    child
                }
            };
        }
        id
    }

    /// Make the namespace `path`, relative to the current one, the current namespace.
    ///
    /// Returns the previous namespace, to be passed to [Ctx::leave_namespace].
    pub fn enter_namespace(&mut self, path: &Path) -> NamespaceId {
        let previous = self.current;
        self.current = self.subspace(previous, &path.segments);
        trace!("entering namespace {}", self.namespace(self.current).path());
        previous
    }

    /// Return to `previous` at the end of the namespace `name`, closed by `end name`.
    pub fn leave_namespace(
        &mut self,
        previous: NamespaceId,
        name: &Path,
        end: &Path,
    ) -> LoweringResult<()> {
        self.current = previous;
        if name != end {
            return Err(LoweringError::MismatchedNamespaceEnd {
                expected: name.to_string(),
                span: end.span.to_miette(),
            }
            .into());
        }
        Ok(())
    }

    /// The namespaces selected by `A.B` or, recursively, by `A.B.*`.
    fn select(&self, ns: &NsPath) -> LoweringResult<Vec<NamespaceId>> {
        let id = self.find_namespace(self.root(), &ns.path.segments).ok_or_else(|| {
            LoweringError::UnknownNamespace { path: ns.path.to_string(), span: ns.span.to_miette() }
        })?;
        if !ns.recursive {
            return Ok(vec![id]);
        }
        let mut selected = vec![id];
        let mut i = 0;
        while i < selected.len() {
            selected.extend(self.namespace(selected[i]).children());
            i += 1;
        }
        Ok(selected)
    }

    pub fn open(&mut self, ns: &NsPath) -> LoweringResult<()> {
        for id in self.select(ns)? {
            if !self.open.contains(&id) {
                self.open.push(id);
            }
        }
        Ok(())
    }

    pub fn close(&mut self, ns: &NsPath) -> LoweringResult<()> {
        let selected = self.select(ns)?;
        self.open.retain(|id| !selected.contains(id));
        Ok(())
    }

    /// Start lowering a new file in the root namespace with no open namespaces.
    pub fn begin_file(&mut self) -> FilePosition {
        let open = std::mem::take(&mut self.open);
        let current = std::mem::replace(&mut self.current, NamespaceId(0));
        FilePosition { current, open }
    }

    pub fn end_file(&mut self, position: FilePosition) {
        self.current = position.current;
        self.open = position.open;
    }

    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(HashMap::default());
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Bind `name` to `term` in the innermost local scope, or in the current namespace
    /// if there is no local scope.
    pub(crate) fn bind(&mut self, name: &str, span: Span, term: &Term) -> LoweringResult<()> {
        let already_defined =
            || LoweringError::AlreadyDefined { name: name.to_owned(), span: span.to_miette() };
        // Terms which already carry a name keep it
        term.set_name(name);

        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(name) {
                return Err(already_defined().into());
            }
            scope.insert(name.to_owned(), term.clone());
            return Ok(());
        }

        let current = self.current;
        let namespace = self.namespace_mut(current);
        if namespace.contains(name) {
            return Err(already_defined().into());
        }
        term.set_namespace(namespace.path());
        namespace.put(name.to_owned(), term.clone());
        trace!("declared {}", namespace.qualify(name));
        Ok(())
    }

    fn lookup_in(&self, id: NamespaceId, segments: &[Ident]) -> Option<&Term> {
        let namespace = self.namespace(id);
        let name = join(segments);
        if let Some(term) = namespace.get(&name) {
            return Some(term);
        }
        match segments {
            [first, rest @ ..] if !rest.is_empty() => {
                self.lookup_in(namespace.child(&first.id)?, rest)
            }
            _ => None,
        }
    }

    /// Resolve `path`.
    ///
    /// Local scopes are searched innermost first, then the current namespace and its
    /// ancestors, and finally the open namespaces, where the name must be unique.
    pub fn lookup(&self, path: &Path) -> LoweringResult<Term> {
        let name = path.to_string();
        for scope in self.scopes.iter().rev() {
            if let Some(term) = scope.get(&name) {
                return Ok(term.clone());
            }
        }

        for id in self.ancestors(self.current) {
            if let Some(term) = self.lookup_in(id, &path.segments) {
                return Ok(term.clone());
            }
        }

        let mut candidates: Vec<(String, &Term)> = Vec::new();
        for id in &self.open {
            if let Some(term) = self.lookup_in(*id, &path.segments) {
                if candidates.iter().all(|(_, other)| *other != term) {
                    candidates.push((self.namespace(*id).qualify(&name), term));
                }
            }
        }

        match candidates.as_slice() {
            [] => Err(LoweringError::UnknownIdentifier { name, span: path.span.to_miette() }.into()),
            [(_, term)] => Ok((*term).clone()),
            [init @ .., (last, _)] => {
                let init: Vec<&str> = init.iter().map(|(path, _)| path.as_str()).collect();
                Err(LoweringError::AmbiguousIdentifier {
                    name,
                    candidates: format!("{} or {}", init.join(", "), last),
                    span: path.span.to_miette(),
                }
                .into())
            }
        }
    }

    pub(crate) fn set_preference(&mut self, term: &Term, preference: i32) {
        let current = self.current;
        self.namespace_mut(current).set_preference(term.clone(), preference);
    }

    pub(crate) fn set_documentation(&mut self, name: &str, doc: String) {
        let current = self.current;
        self.namespace_mut(current).set_documentation(name.to_owned(), doc);
    }

    /// The documentation attached to the declaration of `term`.
    pub fn documentation(&self, term: &Term) -> Option<&str> {
        let path = term.namespace()?;
        let name = term.name()?;
        self.namespaces.iter().find(|ns| ns.path() == path)?.documentation(name)
    }
}

fn join(segments: &[Ident]) -> String {
    let ids: Vec<&str> = segments.iter().map(|segment| segment.id.as_str()).collect();
    ids.join(".")
}
