//! Lazy streams demonstration
//!
//! Walks through suspensions, infinite sources, folds, successive
//! approximation and thread-shared suspensions.
//!
//! Run with: cargo run --features cli --bin stream-demo -- --section all

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use lazy_stream::approximation::{
    accelerated_sequence, euler_transform, pi_stream, sqrt_stream, stream_limit,
};
use lazy_stream::sources::{
    add_streams, fibonacci, integers_from, iterate, ones, partial_sums, primes, repeat,
};
use lazy_stream::{Stream, Suspension, SyncSuspension};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "stream-demo",
    version,
    about = "Lazy, memoized streams in action"
)]
struct Opt {
    /// Number of elements to print from each infinite stream
    #[arg(short = 'n', long = "count", default_value_t = 10)]
    count: usize,

    /// Length of the stream materialized by the stack-safety check
    #[arg(long = "stack-test", default_value_t = 1_000_000)]
    stack_test: usize,

    /// Which part of the walkthrough to run
    #[arg(long = "section", value_enum, default_value_t = Section::All)]
    section: Section,

    /// Log filter used when RUST_LOG is unset
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Section {
    Basics,
    Sources,
    Fold,
    Paradigm,
    Sync,
    All,
}

impl Section {
    fn includes(self, other: Section) -> bool {
        self == Section::All || self == other
    }
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    init_tracing(&opt.log_level)?;
    info!(section = ?opt.section, count = opt.count, "starting stream demo");

    println!("=== Lazy Streams ===\n");

    if opt.section.includes(Section::Basics) {
        demonstrate_basics(opt.count);
    }
    if opt.section.includes(Section::Sources) {
        demonstrate_sources(opt.count);
    }
    if opt.section.includes(Section::Fold) {
        demonstrate_folds(opt.stack_test)?;
    }
    if opt.section.includes(Section::Paradigm) {
        demonstrate_approximation(opt.count);
    }
    if opt.section.includes(Section::Sync) {
        demonstrate_sync()?;
    }

    println!("\n=== Done ===");
    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log level `{level}`"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

fn heading(title: &str) {
    println!("\n{title}");
    println!("{}", "=".repeat(60));
}

fn demonstrate_basics(count: usize) {
    heading("Suspensions and Cons Cells");

    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let answer = Suspension::new(move || {
        counter.set(counter.get() + 1);
        6 * 7
    });
    println!("Before forcing: {answer:?} (computations run: {})", calls.get());
    let (first, second) = (*answer.force(), *answer.force());
    println!(
        "Forced twice:   {first}, {second} (computations run: {})",
        calls.get()
    );

    println!("\nOnly forced cells are evaluated:");
    let naturals = integers_from(1).map(|x| x * x);
    let _ = naturals.nth(2);
    println!("  After nth(2): {naturals:?}");

    println!("\nFused pipeline map(x * 2) -> filter(y % 4 == 0) -> take({count}):");
    let forced = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&forced);
    let result = iterate(1i64, |x| x + 1)
        .map(move |x| {
            counter.set(counter.get() + 1);
            x * 2
        })
        .filter(|y| y % 4 == 0)
        .take(count)
        .to_vec();
    println!("  Result: {result:?}");
    println!("  Upstream elements forced: {}", forced.get());
}

fn demonstrate_sources(count: usize) {
    heading("Infinite Streams");

    println!("Integers starting from 1:");
    println!("  {:?}", integers_from(1).take(count).to_vec());

    println!("\nOnes:");
    println!("  {:?}", ones().take(count).to_vec());

    println!("\nPowers of 2:");
    println!("  {:?}", iterate(1u64, |x| x * 2).take(count).to_vec());

    println!("\nFibonacci:");
    println!("  {:?}", fibonacci().take(count).to_vec());
    println!("  Fits in u64 up to element {}", fibonacci().count() - 1);

    println!("\nPrimes (sieve of Eratosthenes):");
    println!("  {:?}", primes().take(count).to_vec());
    if let Some(prime) = primes().nth(49) {
        println!("  50th prime: {prime}");
    }

    println!("\nAdding streams element-wise:");
    let sums = add_streams(integers_from(1), integers_from(10).map(|x| x * 10));
    println!("  {:?}", sums.take(count).to_vec());

    println!("\nInterleaving two infinite streams:");
    let mixed = repeat(0).interleave(integers_from(1));
    println!("  {:?}", mixed.take(count).to_vec());
}

fn demonstrate_folds(stack_test: usize) -> Result<()> {
    heading("Folds and Traversal");

    let found = integers_from(1).fold_right(false, |item, rest| *item.force() == 7 || *rest.force());
    println!("fold_right finds 7 in an infinite stream: {found}");

    let rendered = integers_from(1).take(4).fold_right(String::from("nil"), |item, rest| {
        format!("({} . {})", item.force(), rest.force())
    });
    println!("fold_right builds a nested list: {rendered}");

    let total = integers_from(1).take(100).fold_left(0, |acc, x| acc + x);
    println!("fold_left sums 1..=100: {total}");

    let running = partial_sums(integers_from(1)).take(5).to_vec();
    println!("Running totals: {running:?}");

    println!("\nMaterializing {stack_test} elements:");
    let items = iterate(0usize, |x| x + 1)
        .take(stack_test)
        .try_to_vec()
        .context("materializing the stack-safety stream")?;
    debug!(elements = items.len(), "stack-safety stream materialized");
    println!(
        "  Collected {} elements, last = {:?}",
        items.len(),
        items.last()
    );
    Ok(())
}

fn demonstrate_approximation(count: usize) {
    heading("Successive Approximation");

    println!("Square root of 2:");
    for (i, guess) in sqrt_stream(2.0).take(6).iter().enumerate() {
        println!("  Iteration {i}: {guess:.10}");
    }
    println!("  Within 0.0001: {:?}", stream_limit(sqrt_stream(2.0), 0.0001));

    println!("\nApproximating pi, pi/4 = 1 - 1/3 + 1/5 - 1/7 + ...");
    print_sequence("Partial sums", pi_stream().take(count));
    print_sequence("Euler transform", euler_transform(pi_stream()).take(count));
    // Deeper rows of the tableau divide by differences that underflow to 0.
    print_sequence(
        "Accelerated",
        accelerated_sequence(euler_transform, pi_stream()).take(count.min(8)),
    );
    println!("  Actual: {:.15}", std::f64::consts::PI);
}

fn print_sequence(label: &str, approximations: Stream<f64>) {
    println!("  {label}:");
    for (i, value) in approximations.iter().enumerate() {
        println!("    {i:2}: {value:.15}");
    }
}

fn demonstrate_sync() -> Result<()> {
    heading("Sharing a Suspension Across Threads");

    let computations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&computations);
    let shared = SyncSuspension::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        (1..=1_000u64).map(|n| n * n).sum::<u64>()
    });

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let shared = shared.clone();
            thread::spawn(move || {
                let value = *shared.force();
                debug!(worker, value, "worker forced shared suspension");
                value
            })
        })
        .collect();

    for (worker, handle) in handles.into_iter().enumerate() {
        let value = handle
            .join()
            .map_err(|_| anyhow!("worker {worker} panicked"))?;
        println!("  Worker {worker} saw {value}");
    }
    println!(
        "  Computation ran {} time(s)",
        computations.load(Ordering::SeqCst)
    );
    Ok(())
}
