use quarry_lang_kernel::{HashMap, HashSet, Term};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespaceId(pub(crate) usize);

/// A named collection of terms, nested in a parent namespace.
///
/// Names may contain dots (`S.mk`, `a.field`); such names are stored as they are and take
/// precedence over a child namespace of the same prefix.
#[derive(Debug)]
pub struct Namespace {
    /// Full dot-separated path, empty for the root
    path: String,
    parent: Option<NamespaceId>,
    children: Vec<(String, NamespaceId)>,
    /// Terms in declaration order
    terms: Vec<Term>,
    members: HashSet<Term>,
    names: HashMap<String, Term>,
    preferences: HashMap<Term, i32>,
    docs: HashMap<String, String>,
}

impl Namespace {
    pub(crate) fn new(path: String, parent: Option<NamespaceId>) -> Self {
        Namespace {
            path,
            parent,
            children: Vec::new(),
            terms: Vec::new(),
            members: HashSet::default(),
            names: HashMap::default(),
            preferences: HashMap::default(),
            docs: HashMap::default(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parent(&self) -> Option<NamespaceId> {
        self.parent
    }

    pub fn children(&self) -> impl Iterator<Item = NamespaceId> + '_ {
        self.children.iter().map(|(_, id)| *id)
    }

    pub fn child(&self, name: &str) -> Option<NamespaceId> {
        self.children.iter().find(|(child, _)| child == name).map(|(_, id)| *id)
    }

    pub(crate) fn add_child(&mut self, name: String, id: NamespaceId) {
        self.children.push((name, id));
    }

    pub fn get(&self, name: &str) -> Option<&Term> {
        self.names.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// The full path of `name` declared in this namespace.
    pub fn qualify(&self, name: &str) -> String {
        if self.path.is_empty() { name.to_owned() } else { format!("{}.{}", self.path, name) }
    }

    pub(crate) fn put(&mut self, name: String, term: Term) {
        if self.members.insert(term.clone()) {
            self.terms.push(term.clone());
        }
        self.names.insert(name, term);
    }

    /// Every term of this namespace in declaration order, each listed once.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn preference(&self, term: &Term) -> Option<i32> {
        self.preferences.get(term).copied()
    }

    pub(crate) fn set_preference(&mut self, term: Term, preference: i32) {
        self.preferences.insert(term, preference);
    }

    pub fn documentation(&self, name: &str) -> Option<&str> {
        self.docs.get(name).map(String::as_str)
    }

    pub(crate) fn set_documentation(&mut self, name: String, doc: String) {
        self.docs.insert(name, doc);
    }
}
