use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use quarry_lang_printer::PrintToString;

use crate::matcher::Matcher;
use crate::print::PrintDefinition;
use crate::result::{SpecResult, SpecializationError};
use crate::telescope::Telescope;

/// A shared handle on an immutable term.
///
/// Two handles are equal iff they point to the same allocation. Use [Term::equivalent] to
/// compare terms structurally.
#[derive(Clone)]
pub struct Term(Arc<TermData>);

struct TermData {
    params: Telescope,
    /// `None` for the universe, which is its own type
    typ: Option<Term>,
    /// `None` for declarations, which are their own base
    base: Option<Term>,
    /// Arguments to the parameters of `base`. Empty for declarations.
    arguments: Vec<Term>,
    meta: Metadata,
}

/// Write-once information attached to a term after its construction.
#[derive(Default)]
struct Metadata {
    name: OnceLock<String>,
    namespace: OnceLock<String>,
    implicit: AtomicBool,
    constructor: OnceLock<Term>,
}

impl Term {
    /// Create a new universe. The universe is its own type.
    pub fn universe() -> Term {
        Term::from_data(Telescope::new(), None, None, vec![])
    }

    /// Create a new primitive declaration `params : typ`.
    pub fn declaration(params: Telescope, typ: Term) -> Term {
        Term::from_data(params, Some(typ), None, vec![])
    }

    /// Create a new specialization of `base` with the given arguments.
    ///
    /// The number of arguments must equal the number of parameters of `base`.
    pub fn specialization(
        params: Telescope,
        typ: Term,
        base: Term,
        arguments: Vec<Term>,
    ) -> SpecResult<Term> {
        let expected = base.params().len();
        if arguments.len() != expected {
            return Err(SpecializationError::ArgumentCount {
                term: base.to_string(),
                expected,
                actual: arguments.len(),
            });
        }
        Ok(Term::from_data(params, Some(typ), Some(base), arguments))
    }

    /// Like [Term::specialization], for callers that have already established the arity.
    pub(crate) fn specialization_unchecked(
        params: Telescope,
        typ: Term,
        base: Term,
        arguments: Vec<Term>,
    ) -> Term {
        assert_eq!(
            arguments.len(),
            base.params().len(),
            "specialization of {base} with the wrong number of arguments"
        );
        Term::from_data(params, Some(typ), Some(base), arguments)
    }

    fn from_data(
        params: Telescope,
        typ: Option<Term>,
        base: Option<Term>,
        arguments: Vec<Term>,
    ) -> Term {
        Term(Arc::new(TermData { params, typ, base, arguments, meta: Metadata::default() }))
    }

    pub fn params(&self) -> &Telescope {
        &self.0.params
    }

    pub fn typ(&self) -> &Term {
        self.0.typ.as_ref().unwrap_or(self)
    }

    pub fn is_universe(&self) -> bool {
        self.0.typ.is_none()
    }

    pub fn base(&self) -> &Term {
        self.0.base.as_ref().unwrap_or(self)
    }

    pub fn is_base(&self) -> bool {
        self.0.base.is_none()
    }

    /// The arguments of a specialization. A declaration's arguments are its own parameters.
    pub fn arguments(&self) -> &[Term] {
        if self.is_base() { self.0.params.terms() } else { &self.0.arguments }
    }

    pub fn explicit_params(&self) -> Vec<Term> {
        self.0.params.explicit()
    }

    pub fn name(&self) -> Option<&str> {
        self.0.meta.name.get().map(String::as_str)
    }

    /// Attach a name. Returns `false` if the term was already named.
    pub fn set_name(&self, name: impl Into<String>) -> bool {
        self.0.meta.name.set(name.into()).is_ok()
    }

    /// The full path of the namespace the term was declared in.
    pub fn namespace(&self) -> Option<&str> {
        self.0.meta.namespace.get().map(String::as_str)
    }

    pub fn set_namespace(&self, path: impl Into<String>) -> bool {
        self.0.meta.namespace.set(path.into()).is_ok()
    }

    pub fn implicit(&self) -> bool {
        self.0.meta.implicit.load(Ordering::Relaxed)
    }

    pub fn set_implicit(&self, implicit: bool) {
        self.0.meta.implicit.store(implicit, Ordering::Relaxed)
    }

    /// The constructor of a structure type
    pub fn constructor(&self) -> Option<&Term> {
        self.0.meta.constructor.get()
    }

    pub fn set_constructor(&self, constructor: Term) -> bool {
        self.0.meta.constructor.set(constructor).is_ok()
    }

    /// Copy the name and the implicit flag of `other` onto this term.
    pub(crate) fn inherit_metadata(&self, other: &Term) {
        if let Some(name) = other.name() {
            self.set_name(name);
        }
        self.set_implicit(other.implicit());
    }

    /// A declaration depends on `list` if it is contained in it,
    /// a specialization if any of its arguments does.
    pub fn depends_on(&self, list: &[Term]) -> bool {
        if self.is_base() {
            list.contains(self)
        } else {
            self.0.arguments.iter().any(|arg| arg.depends_on(list))
        }
    }

    /// Whether the type or any of the parameters of this term depend on `list`.
    pub fn signature_depends_on(&self, list: &[Term]) -> bool {
        let type_depends = match &self.0.typ {
            Some(typ) => typ.depends_on(list),
            None => self.depends_on(list),
        };
        type_depends || self.params().iter().any(|param| param.signature_depends_on(list))
    }

    /// Structural equality up to renaming of parameters.
    pub fn equivalent(&self, other: &Term) -> bool {
        if self == other {
            return true;
        }
        if self.base() != other.base() {
            return false;
        }
        let n = self.params().len();
        if n != other.params().len() {
            return false;
        }
        if n == 0 {
            return self
                .arguments()
                .iter()
                .zip(other.arguments())
                .all(|(lhs, rhs)| lhs.equivalent(rhs));
        }
        let same_implicits =
            self.params().iter().zip(other.params().iter()).all(|(p, q)| p.implicit() == q.implicit());
        if !same_implicits {
            return false;
        }
        let matcher = Matcher::new(self.params().terms().to_vec());
        matcher.matches(self, other)
    }

    /// Apply this term to (some of) its parameters.
    ///
    /// Each argument is either a term or `None`, meaning that it must be inferred from the other
    /// arguments. Parameters beyond the supplied arguments are cloned and remain parameters of the
    /// result, behind `extra_params`.
    pub fn specialize(&self, extra_params: Telescope, args: &[Option<Term>]) -> SpecResult<Term> {
        let params = self.params();
        if args.len() > params.len() {
            return Err(SpecializationError::ArgumentCount {
                term: self.to_string(),
                expected: params.len(),
                actual: args.len(),
            });
        }

        if args.is_empty() && extra_params.is_empty() {
            return Ok(self.clone());
        }

        let matcher = Matcher::new(params.terms().to_vec());
        for (param, arg) in params.iter().zip(args) {
            if let Some(arg) = arg {
                if !matcher.matches(param, arg) {
                    return Err(SpecializationError::MismatchedArgument {
                        parameter: param.print_definition_to_string(),
                        argument: arg.to_string(),
                    });
                }
            }
        }

        let mut arguments = Vec::with_capacity(params.len());
        for (param, arg) in params.iter().zip(args) {
            match arg {
                Some(arg) => arguments.push(arg.clone()),
                None => match matcher.get_solution(param) {
                    Some(solution) => arguments.push(solution),
                    None => {
                        return Err(SpecializationError::UnresolvedImplicit {
                            parameter: param.print_definition_to_string(),
                        });
                    }
                },
            }
        }

        let mut new_params = extra_params;
        for param in params.iter().skip(args.len()) {
            let clone = matcher.clone_term(&Telescope::new(), param);
            matcher.assert_matches(param, &clone);
            new_params.push(clone.clone());
            arguments.push(clone);
        }

        if !self.is_base() {
            let base_args: Vec<Option<Term>> =
                self.arguments().iter().map(|arg| Some(matcher.convert(arg))).collect();
            return matcher.convert(self.base()).specialize(new_params, &base_args);
        }

        let constructor = match self.constructor() {
            Some(ctor) => {
                let ctor_args: Vec<Option<Term>> = arguments.iter().cloned().map(Some).collect();
                Some(ctor.specialize(new_params.clone(), &ctor_args)?)
            }
            None => None,
        };
        let result = Term::specialization_unchecked(
            new_params,
            matcher.convert(self.typ()),
            self.clone(),
            arguments,
        );
        if let Some(ctor) = constructor {
            result.set_constructor(ctor);
        }
        Ok(result)
    }

    /// Apply this term to explicit arguments for its first parameters.
    pub fn apply(&self, args: &[Term]) -> SpecResult<Term> {
        let args: Vec<Option<Term>> = args.iter().cloned().map(Some).collect();
        self.specialize(Telescope::new(), &args)
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print_to_string(None))
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Term({}@{:p})", self.print_definition_to_string(), Arc::as_ptr(&self.0))
    }
}
