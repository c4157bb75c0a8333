use quarry_lang_kernel::{Telescope, Term};

pub fn decl(name: &str, params: Vec<Term>, typ: &Term) -> Term {
    let term = Term::declaration(Telescope::from(params), typ.clone());
    term.set_name(name);
    term
}

pub fn apply(f: &Term, args: &[Term]) -> Term {
    f.apply(args).unwrap()
}

/// A small library about natural numbers.
pub struct Library {
    pub typ: Term,
    pub nat: Term,
    pub zero: Term,
    /// `succ (n : Nat) : Nat`
    pub succ: Term,
    /// `P (n : Nat) : Type`
    pub p: Term,
    /// `p_zero : P zero`
    pub p_zero: Term,
    /// `p_succ (n : Nat) (h : P n) : P (succ n)`
    pub p_succ: Term,
    /// `Eq (a b : Nat) : Type`
    pub eq: Term,
    /// `refl (n : Nat) : Eq n n`
    pub refl: Term,
    /// `trivial (T : Type) (t : T) : T`
    pub trivial: Term,
}

impl Library {
    pub fn new() -> Self {
        let typ = Term::universe();
        typ.set_name("Type");
        let nat = decl("Nat", vec![], &typ);
        let zero = decl("zero", vec![], &nat);
        let n = decl("n", vec![], &nat);
        let succ = decl("succ", vec![n], &nat);

        let m = decl("m", vec![], &nat);
        let p = decl("P", vec![m], &typ);
        let p_zero = decl("p_zero", vec![], &apply(&p, std::slice::from_ref(&zero)));
        let n = decl("n", vec![], &nat);
        let h = decl("h", vec![], &apply(&p, std::slice::from_ref(&n)));
        let succ_n = apply(&succ, std::slice::from_ref(&n));
        let p_succ = decl("p_succ", vec![n, h], &apply(&p, &[succ_n]));

        let a = decl("a", vec![], &nat);
        let b = decl("b", vec![], &nat);
        let eq = decl("Eq", vec![a, b], &typ);
        let n = decl("n", vec![], &nat);
        let refl = decl("refl", vec![n.clone()], &apply(&eq, &[n.clone(), n]));

        let t_ty = decl("T", vec![], &typ);
        let t = decl("t", vec![], &t_ty);
        let trivial = decl("trivial", vec![t_ty.clone(), t], &t_ty);

        Library { typ, nat, zero, succ, p, p_zero, p_succ, eq, refl, trivial }
    }
}
