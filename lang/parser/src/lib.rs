pub mod cst;
mod grammar;
pub mod lexer;
mod result;

use std::rc::Rc;

use url::Url;

use grammar::cst::{ExpParser, ModuleParser};
use lexer::Lexer;
pub use result::*;

pub fn parse_exp(s: &str) -> Result<Rc<cst::exp::Exp>, ParseError> {
    ExpParser::new().parse(Lexer::new(s)).map_err(From::from)
}

pub fn parse_module(uri: Url, s: &str) -> Result<cst::stmt::Module, ParseError> {
    let stmts = ModuleParser::new().parse(Lexer::new(s))?;
    Ok(cst::stmt::Module { uri, stmts })
}

#[cfg(test)]
mod parser_tests {
    use super::cst::exp::{Body, Exp};
    use super::cst::stmt::{Module, Stmt};
    use super::*;

    fn parse(s: &str) -> Module {
        parse_module(Url::parse("inmemory:///test.qry").unwrap(), s).unwrap()
    }

    #[test]
    fn parse_declarations() {
        let module = parse("let A : Type\nlet a b : A\n;");
        assert_eq!(module.stmts.len(), 3);
        let Stmt::Let(decl) = &module.stmts[1] else { panic!("expected let") };
        let names: Vec<String> = decl.names.iter().map(|name| name.to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(matches!(decl.body, Body::Type(_)));
        assert!(matches!(module.stmts[2], Stmt::Empty(_)));
    }

    #[test]
    fn parse_parameters() {
        let module = parse("let id {A : Type} (x y : A) : A");
        let Stmt::Let(decl) = &module.stmts[0] else { panic!("expected let") };
        assert_eq!(decl.params.len(), 2);
        assert!(decl.params[0].implicit);
        assert!(!decl.params[1].implicit);
        assert_eq!(decl.params[1].binding.names.len(), 2);
    }

    #[test]
    fn parse_preference_and_docs() {
        let module = parse("/// The successor\n/// of a number\nlet [10%] succ (n : Nat) : Nat");
        let Stmt::Let(decl) = &module.stmts[0] else { panic!("expected let") };
        assert_eq!(decl.preference, Some(10));
        assert_eq!(decl.doc.as_ref().unwrap().text(), "The successor\nof a number");
    }

    #[test]
    fn parse_definition() {
        let module = parse("let two := succ (succ zero)");
        let Stmt::Let(def) = &module.stmts[0] else { panic!("expected let") };
        let Body::Value(exp) = &def.body else { panic!("expected a definition") };
        let Exp::App(app) = &**exp else { panic!("expected an application") };
        assert_eq!(app.args.len(), 1);
    }

    #[test]
    fn parse_structure_and_literal() {
        let module = parse(
            "structure Pointed (A : Type) := { point : A, other (x : A) : A }\n\
             let p := Pointed Nat { point := zero, other (x : Nat) := x }",
        );
        let Stmt::Structure(structure) = &module.stmts[0] else { panic!("expected structure") };
        assert_eq!(structure.name.id, "Pointed");
        assert_eq!(structure.fields.len(), 2);
        let Stmt::Let(def) = &module.stmts[1] else { panic!("expected let") };
        let Body::Value(exp) = &def.body else { panic!("expected a definition") };
        assert!(matches!(&**exp, Exp::StructLit(lit) if lit.fields.len() == 2));
    }

    #[test]
    fn parse_namespaces() {
        let module = parse("namespace A.B\n let x : Type\nend A.B\nopen A.*\nclose A.B");
        let Stmt::Namespace(ns) = &module.stmts[0] else { panic!("expected namespace") };
        assert_eq!(ns.name.to_string(), "A.B");
        assert_eq!(ns.end.to_string(), "A.B");
        assert_eq!(ns.stmts.len(), 1);
        assert!(matches!(&module.stmts[1], Stmt::Open(path) if path.recursive));
        assert!(matches!(&module.stmts[2], Stmt::Close(path) if !path.recursive));
    }

    #[test]
    fn parse_queries() {
        let module = parse(
            "import \"nat.qry\"\ncheck succ zero\ndocs succ\nprove thm\nsearch 3 (x : Nat) (h : P x)",
        );
        assert!(matches!(&module.stmts[0], Stmt::Import(import) if import.path == "nat.qry"));
        assert!(matches!(module.stmts[1], Stmt::Check(_)));
        assert!(matches!(module.stmts[2], Stmt::Docs(_)));
        assert!(matches!(module.stmts[3], Stmt::Prove(_)));
        let Stmt::Search(search) = &module.stmts[4] else { panic!("expected search") };
        assert_eq!(search.max_results, Some(3));
        assert_eq!(search.params.len(), 2);
    }

    #[test]
    fn parse_lambdas() {
        let exp = parse_exp("λ (n : Nat) := succ n").unwrap();
        assert!(matches!(&*exp, Exp::Lam(lam) if lam.params.len() == 1));
        let exp = parse_exp("\\ (n : Nat) := n").unwrap();
        assert!(matches!(&*exp, Exp::Lam(_)));
        let exp = parse_exp("f (λ (n : Nat) := n) zero").unwrap();
        assert!(matches!(&*exp, Exp::App(app) if app.args.len() == 2));
    }

    #[test]
    fn parse_paths() {
        let exp = parse_exp("Arith.Nat.add x").unwrap();
        let Exp::App(app) = &*exp else { panic!("expected an application") };
        let Exp::Var(path) = &*app.fun else { panic!("expected a path") };
        assert_eq!(path.segments.len(), 3);
        assert_eq!(path.name().id, "add");
        assert_eq!(path.span.start(), 0);
        assert_eq!(path.span.end(), 13);
    }

    #[test]
    fn unexpected_token() {
        let err = parse_module(Url::parse("inmemory:///test.qry").unwrap(), "let : Type").unwrap_err();
        assert!(matches!(err, ParseError::UnrecognizedToken { .. }));
    }

    #[test]
    fn unexpected_eof() {
        let err = parse_module(Url::parse("inmemory:///test.qry").unwrap(), "let x :").unwrap_err();
        assert!(matches!(err, ParseError::UnrecognizedEof { .. }));
    }

    #[test]
    fn invalid_token() {
        let err = parse_module(Url::parse("inmemory:///test.qry").unwrap(), "let x # Type").unwrap_err();
        assert!(matches!(err, ParseError::InvalidToken { .. }));
    }
}
