use criterion::{Criterion, criterion_group, criterion_main};
use miette::miette;
use quarry_lang_driver::{InMemorySource, Session, SessionOptions};
use url::Url;

const EVEN: &str = "
let Nat : Type
let zero : Nat
let succ (n : Nat) : Nat
let Even (n : Nat) : Prop
let even_zero : Even zero
let even_succ_succ {n : Nat} (h : Even n) : Even (succ (succ n))
let Odd (n : Nat) : Prop
let odd_one : Odd (succ zero)
let odd_succ_succ {n : Nat} (h : Odd n) : Odd (succ (succ n))

search (h : Even (succ (succ (succ (succ (succ (succ zero)))))))
search 3 {n : Nat} (h : Odd n)
";

fn benchmark(c: &mut Criterion) {
    c.bench_function("even.qry", |b| b.iter(|| run(1)));
    c.bench_function("even.qry (4 threads)", |b| b.iter(|| run(4)));
}

fn run(threads: usize) -> miette::Result<()> {
    let uri = Url::parse("inmemory:///even.qry").map_err(|err| miette!("{err}"))?;
    let source = InMemorySource::new().with(uri.clone(), EVEN);
    let options = SessionOptions { max_search_threads: threads, ..Default::default() };
    let mut session = Session::new(source, options);
    session
        .run(&uri, &mut std::io::sink())
        .map_err(|reports| miette!("{} errors while running even.qry", reports.len()))
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
