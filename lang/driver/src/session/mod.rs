use std::io::Write;

use log::debug;
use miette::{NamedSource, Report};
use url::Url;

use quarry_lang_kernel::HashSet;
use quarry_lang_lowering::{Ctx, Lower};
use quarry_lang_miette_util::ToMiette;
use quarry_lang_parser::cst::stmt::{Import, Stmt};
use quarry_lang_parser::parse_module;
use quarry_lang_search::Index;

use crate::fs::FileSource;
use crate::options::SessionOptions;
use crate::result::{DriverError, MainError};

mod index;
mod queries;
mod search;

/// Why the execution of a file stopped.
enum Abort {
    /// An error in the file itself
    Error(MainError),
    /// An imported file failed with `reports`, `error` points at the import statement
    Import { reports: Vec<Report>, error: MainError },
}

impl<E: Into<MainError>> From<E> for Abort {
    fn from(err: E) -> Self {
        Abort::Error(err.into())
    }
}

type ExecResult = Result<(), Abort>;

/// Executes quarry files statement by statement.
///
/// All files run in one session share their declarations. Every file is imported at most once,
/// which also rules out import cycles.
pub struct Session {
    source: Box<dyn FileSource>,
    options: SessionOptions,
    ctx: Ctx,
    /// Canonical URIs of all files that were run or imported
    imported: HashSet<Url>,
    /// Theorems visible from the current namespace, built on demand
    index: Option<Index>,
    /// `search` and `prove` statements are only lowered when this is unset
    run_searches: bool,
}

impl Session {
    pub fn new<S: FileSource + 'static>(source: S, options: SessionOptions) -> Self {
        Session {
            source: Box::new(source),
            options,
            ctx: Ctx::new(),
            imported: HashSet::default(),
            index: None,
            run_searches: true,
        }
    }

    pub fn ctx(&self) -> &Ctx {
        &self.ctx
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Run the file `uri` and write the output of its statements to `out`.
    ///
    /// Execution stops at the first error. Output written before that error is kept.
    pub fn run(&mut self, uri: &Url, out: &mut dyn Write) -> Result<(), Vec<Report>> {
        let canonical = self
            .source
            .canonicalize(uri)
            .map_err(|err| vec![Report::from(MainError::from(err))])?;
        self.imported.insert(canonical);
        self.run_file(uri, out)
    }

    /// Parse and lower the file `uri` and everything it imports without searching.
    pub fn check(&mut self, uri: &Url) -> Result<(), Vec<Report>> {
        self.run_searches = false;
        let result = self.run(uri, &mut std::io::sink());
        self.run_searches = true;
        result
    }

    fn run_file(&mut self, uri: &Url, out: &mut dyn Write) -> Result<(), Vec<Report>> {
        debug!("Running file: {uri}");
        let source =
            self.source.read_to_string(uri).map_err(|err| vec![Report::from(MainError::from(err))])?;
        let report = |err: MainError| {
            Report::from(err).with_source_code(NamedSource::new(uri, source.clone()))
        };

        let module = parse_module(uri.clone(), &source).map_err(|err| vec![report(err.into())])?;
        self.exec_stmts(uri, &module.stmts, out).map_err(|abort| match abort {
            Abort::Error(err) => vec![report(err)],
            Abort::Import { mut reports, error } => {
                reports.push(report(error));
                reports
            }
        })
    }

    fn exec_stmts(&mut self, uri: &Url, stmts: &[Stmt], out: &mut dyn Write) -> ExecResult {
        for stmt in stmts {
            self.exec(uri, stmt, out)?;
        }
        Ok(())
    }

    fn exec(&mut self, uri: &Url, stmt: &Stmt, out: &mut dyn Write) -> ExecResult {
        match stmt {
            Stmt::Empty(_) => {}
            Stmt::Let(decl) => {
                decl.lower(&mut self.ctx)?;
                self.invalidate_index();
            }
            Stmt::Structure(structure) => {
                structure.lower(&mut self.ctx)?;
                self.invalidate_index();
            }
            Stmt::Namespace(ns) => {
                let previous = self.ctx.enter_namespace(&ns.name);
                self.invalidate_index();
                let result = self.exec_stmts(uri, &ns.stmts, out);
                let left = self.ctx.leave_namespace(previous, &ns.name, &ns.end);
                self.invalidate_index();
                result?;
                left?;
            }
            Stmt::Open(path) => {
                self.ctx.open(path)?;
                self.invalidate_index();
            }
            Stmt::Close(path) => {
                self.ctx.close(path)?;
                self.invalidate_index();
            }
            Stmt::Import(import) => self.import(uri, import, out)?,
            Stmt::Check(query) => self.check_query(query, out)?,
            Stmt::Docs(query) => self.docs(query, out)?,
            Stmt::Prove(query) => self.prove(query, out)?,
            Stmt::Search(search) => self.search(search, out)?,
        }
        Ok(())
    }

    /// Run the file at `import.path`, relative to `importer`, unless it was imported before.
    fn import(&mut self, importer: &Url, import: &Import, out: &mut dyn Write) -> ExecResult {
        let Import { span, path } = import;
        let not_found = || DriverError::ImportNotFound { path: path.clone(), span: span.to_miette() };

        let uri = importer.join(path).map_err(|_| not_found())?;
        let canonical = self.source.canonicalize(&uri).map_err(|err| match err {
            DriverError::FileNotFound(_) => not_found(),
            err => err,
        })?;
        if !self.imported.insert(canonical) {
            debug!("Skipping import of {uri}, it was imported before");
            return Ok(());
        }

        let position = self.ctx.begin_file();
        let result = self.run_file(&uri, out);
        self.ctx.end_file(position);
        self.invalidate_index();

        result.map_err(|reports| Abort::Import {
            reports,
            error: DriverError::ImportFailed { path: path.clone(), span: span.to_miette() }.into(),
        })
    }

    fn invalidate_index(&mut self) {
        if self.index.take().is_some() {
            debug!("Invalidated search index");
        }
    }
}
