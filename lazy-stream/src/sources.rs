//! # Stream Sources
//!
//! Constructors for infinite and generated streams, and the element-wise
//! arithmetic used to define streams in terms of other streams.
//!
//! Every source defers each element after the first into a tail
//! suspension. Generators driven by a closure ([`unfold`], [`from_fn`])
//! call it once up front to decide whether the stream is empty, then once
//! per forced tail.

use std::cell::RefCell;
use std::ops::{Add, Mul};
use std::rc::Rc;

use lazy_core::Suspension;

use crate::stream::{Node, Stream};

/// `seed, f(seed), f(f(seed)), ...`
///
/// # Example
/// ```
/// use lazy_stream::sources::iterate;
///
/// let powers = iterate(1u64, |x| x * 2);
/// assert_eq!(powers.take(5).to_vec(), vec![1, 2, 4, 8, 16]);
/// ```
pub fn iterate<A, F>(seed: A, f: F) -> Stream<A>
where
    A: 'static,
    F: Fn(&A) -> A + 'static,
{
    iterate_shared(seed, Rc::new(f))
}

fn iterate_shared<A, F>(seed: A, f: Rc<F>) -> Stream<A>
where
    A: 'static,
    F: Fn(&A) -> A + 'static,
{
    let head = Suspension::evaluated(seed);
    let previous = head.clone();
    Stream::from_suspensions(
        head,
        Suspension::new(move || iterate_shared(f(previous.force()), f)),
    )
}

/// Builds a stream from a state machine: `f` maps a state to the next
/// element and state, or `None` to end the stream.
pub fn unfold<A, S, F>(seed: S, f: F) -> Stream<A>
where
    A: 'static,
    S: 'static,
    F: Fn(S) -> Option<(A, S)> + 'static,
{
    unfold_shared(seed, Rc::new(f))
}

fn unfold_shared<A, S, F>(seed: S, f: Rc<F>) -> Stream<A>
where
    A: 'static,
    S: 'static,
    F: Fn(S) -> Option<(A, S)> + 'static,
{
    match f(seed) {
        None => Stream::empty(),
        Some((item, next)) => Stream::cons_value(item, move || unfold_shared(next, f)),
    }
}

/// Pulls elements from a generator closure until it returns `None`.
pub fn from_fn<A, F>(next: F) -> Stream<A>
where
    A: 'static,
    F: FnMut() -> Option<A> + 'static,
{
    pull(Rc::new(RefCell::new(next)))
}

fn pull<A, F>(source: Rc<RefCell<F>>) -> Stream<A>
where
    A: 'static,
    F: FnMut() -> Option<A> + 'static,
{
    let item = (&mut *source.borrow_mut())();
    match item {
        None => Stream::empty(),
        Some(item) => Stream::cons_value(item, move || pull(source)),
    }
}

/// A stream over an iterator, pulling one item per forced tail, so the
/// iterator may be infinite.
pub fn from_iter_lazy<I>(items: I) -> Stream<I::Item>
where
    I: IntoIterator,
    I::IntoIter: 'static,
    I::Item: 'static,
{
    let mut items = items.into_iter();
    from_fn(move || items.next())
}

/// Collects the iterator up front, then serves it as a stream. Use
/// [`from_iter_lazy`] for infinite iterators.
impl<A: 'static> FromIterator<A> for Stream<A> {
    fn from_iter<I: IntoIterator<Item = A>>(items: I) -> Self {
        let items: Vec<A> = items.into_iter().collect();
        from_iter_lazy(items)
    }
}

/// The same value forever.
pub fn repeat<A>(value: A) -> Stream<A>
where
    A: Clone + 'static,
{
    iterate(value, A::clone)
}

/// # Scheme equivalent
/// ```scheme
/// (define ones (cons-stream 1 ones))
/// ```
pub fn ones() -> Stream<i64> {
    repeat(1)
}

/// `n, n + 1, n + 2, ...`
///
/// # Scheme equivalent
/// ```scheme
/// (define (integers-starting-from n)
///   (cons-stream n (integers-starting-from (+ n 1))))
/// ```
pub fn integers_from(n: i64) -> Stream<i64> {
    iterate(n, |x| x + 1)
}

/// `0, 1, 1, 2, 3, 5, ...`, finite in `u64`: the stream ends at F(93),
/// the largest Fibonacci number that fits.
pub fn fibonacci() -> Stream<u64> {
    // The successor is `None` once it would overflow.
    unfold(Some((0u64, Some(1u64))), |state| {
        let (current, next) = state?;
        Some((current, next.map(|next| (next, current.checked_add(next)))))
    })
}

/// The primes, by the sieve of Eratosthenes: each prime found wraps the
/// remaining candidates in one more lazy filter.
///
/// Finding the `k`-th prime forces through `k` nested filters, so stack use
/// grows with the number of primes produced, not with the gaps between
/// them.
///
/// # Example
/// ```
/// use lazy_stream::sources::primes;
///
/// assert_eq!(primes().take(6).to_vec(), vec![2, 3, 5, 7, 11, 13]);
/// ```
pub fn primes() -> Stream<u64> {
    sieve(iterate(2u64, |n| n + 1))
}

fn sieve(candidates: Stream<u64>) -> Stream<u64> {
    match &candidates.node {
        Node::Empty => Stream::empty(),
        Node::Cons(head, tail) => {
            let prime = *head.force();
            let tail = tail.clone();
            Stream::cons_value(prime, move || {
                sieve(tail.force().clone().filter(move |n| n % prime != 0))
            })
        }
    }
}

/// Element-wise sum, as long as the shorter stream.
pub fn add_streams<A>(left: Stream<A>, right: Stream<A>) -> Stream<A>
where
    A: Add<Output = A> + Clone + 'static,
{
    left.zip_with(right, |a, b| a.clone() + b.clone())
}

/// Element-wise product, as long as the shorter stream.
pub fn mul_streams<A>(left: Stream<A>, right: Stream<A>) -> Stream<A>
where
    A: Mul<Output = A> + Clone + 'static,
{
    left.zip_with(right, |a, b| a.clone() * b.clone())
}

pub fn scale_stream<A>(stream: Stream<A>, factor: A) -> Stream<A>
where
    A: Mul<Output = A> + Clone + 'static,
{
    stream.map(move |x| x.clone() * factor.clone())
}

/// `s0, s0 + s1, s0 + s1 + s2, ...`
pub fn partial_sums<A>(stream: Stream<A>) -> Stream<A>
where
    A: Add<Output = A> + Clone + Default + 'static,
{
    stream.scan(A::default(), |acc, x| acc.clone() + x.clone())
}
