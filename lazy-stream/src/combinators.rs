//! # Lazy Combinators
//!
//! Stream-to-stream transformations. Each one builds the first cell of its
//! result and defers everything else into the new tail suspension, so a
//! pipeline like `map(f).filter(p).take(n)` pulls one upstream element at a
//! time and never materializes an intermediate collection.
//!
//! Deciding whether a result is empty sometimes needs upstream work:
//! `filter` and `skip_while` must find their first surviving element, and
//! they do it with a loop so long runs of rejected elements cost no stack.
//! Everything else forces nothing at construction.
//!
//! Closures are stored behind an `Rc` so the same function value is shared
//! by every cell of the result.

use std::rc::Rc;

use lazy_core::Suspension;

use crate::sources::iterate;
use crate::stream::{Node, Stream};

impl<A: 'static> Stream<A> {
    /// At most the first `n` elements.
    ///
    /// Never forces anything: the recursive call for the remainder is
    /// suspended in the new tail. The last cell's tail is empty outright,
    /// so taking `n` elements never forces the input's `n`-th tail.
    ///
    /// # Example
    /// ```
    /// use lazy_stream::sources::integers_from;
    ///
    /// assert_eq!(integers_from(1).take(5).to_vec(), vec![1, 2, 3, 4, 5]);
    /// ```
    #[must_use]
    pub fn take(self, n: usize) -> Stream<A> {
        if n == 0 {
            return Stream::empty();
        }
        match &self.node {
            Node::Empty => Stream::empty(),
            Node::Cons(head, tail) => {
                let rest = if n == 1 {
                    Suspension::evaluated(Stream::empty())
                } else {
                    let tail = tail.clone();
                    Suspension::new(move || tail.force().clone().take(n - 1))
                };
                Stream::from_suspensions(head.clone(), rest)
            }
        }
    }

    /// Applies `f` to each element when that element is forced.
    ///
    /// Built on [`fold_right`](Stream::fold_right): the combiner wraps the
    /// current element in a new suspension and defers the folded rest into
    /// the new tail, so nothing upstream is forced here.
    ///
    /// # Scheme equivalent
    /// ```scheme
    /// (stream-map f s)
    /// ```
    pub fn map<B, F>(self, f: F) -> Stream<B>
    where
        B: 'static,
        F: Fn(&A) -> B + 'static,
    {
        let f = Rc::new(f);
        self.fold_right(Stream::empty(), move |head, rest| {
            let head = head.clone();
            let f = Rc::clone(&f);
            Stream::cons(move || f(head.force()), move || rest.force().clone())
        })
    }

    /// Keeps the elements satisfying `predicate`.
    ///
    /// Finds the first match eagerly; later matches are found when the
    /// corresponding tail is forced.
    ///
    /// # Scheme equivalent
    /// ```scheme
    /// (stream-filter pred s)
    /// ```
    pub fn filter<P>(self, predicate: P) -> Stream<A>
    where
        P: Fn(&A) -> bool + 'static,
    {
        filter_shared(self, Rc::new(predicate))
    }

    /// Pairs elements with another stream's, ending with the shorter one.
    ///
    /// `f` runs when a result element is forced.
    pub fn zip_with<B, C, F>(self, other: Stream<B>, f: F) -> Stream<C>
    where
        B: 'static,
        C: 'static,
        F: Fn(&A, &B) -> C + 'static,
    {
        zip_with_shared(self, other, Rc::new(f))
    }

    /// Elements up to, not including, the first one failing `predicate`.
    pub fn take_while<P>(self, predicate: P) -> Stream<A>
    where
        P: Fn(&A) -> bool + 'static,
    {
        take_while_shared(self, Rc::new(predicate))
    }

    /// Skips the leading elements satisfying `predicate`.
    #[must_use]
    pub fn skip_while<P>(self, predicate: P) -> Stream<A>
    where
        P: Fn(&A) -> bool,
    {
        let mut current = self;
        loop {
            let next = match &current.node {
                Node::Empty => break,
                Node::Cons(head, tail) => {
                    if !predicate(head.force()) {
                        break;
                    }
                    tail.force().clone()
                }
            };
            current = next;
        }
        current
    }

    /// All of `self`, then all of `other`.
    #[must_use]
    pub fn append(self, other: Stream<A>) -> Stream<A> {
        self.append_deferred(Suspension::evaluated(other))
    }

    /// Like [`append`](Self::append), but `rest` is only forced once `self`
    /// is exhausted.
    #[must_use]
    pub fn append_deferred(self, rest: Suspension<Stream<A>>) -> Stream<A> {
        match &self.node {
            Node::Empty => rest.force().clone(),
            Node::Cons(head, tail) => {
                let tail = tail.clone();
                Stream::from_suspensions(
                    head.clone(),
                    Suspension::new(move || tail.force().clone().append_deferred(rest)),
                )
            }
        }
    }

    /// Alternates elements of `self` and `other`, starting with `self`.
    /// Unlike [`append`](Self::append), every element of an infinite `other`
    /// is reached even when `self` is infinite too.
    #[must_use]
    pub fn interleave(self, other: Stream<A>) -> Stream<A> {
        match &self.node {
            Node::Empty => other,
            Node::Cons(head, tail) => {
                let tail = tail.clone();
                Stream::from_suspensions(
                    head.clone(),
                    Suspension::new(move || other.interleave(tail.force().clone())),
                )
            }
        }
    }

    /// Maps each element to a stream and concatenates the results.
    ///
    /// # Scheme equivalent
    /// ```scheme
    /// (flatmap f s)
    /// ```
    pub fn flat_map<B, F>(self, f: F) -> Stream<B>
    where
        B: 'static,
        F: Fn(&A) -> Stream<B> + 'static,
    {
        flat_map_shared(self, Rc::new(f))
    }

    /// Running accumulation: element `i` is `f` applied to element `i - 1`
    /// of the result (or `init`) and element `i` of `self`.
    ///
    /// Forcing a tail forces the running value before it.
    pub fn scan<S, F>(self, init: S, f: F) -> Stream<S>
    where
        S: Clone + 'static,
        F: Fn(&S, &A) -> S + 'static,
    {
        scan_shared(self, init, Rc::new(f))
    }
}

impl<A: Clone + 'static> Stream<A> {
    pub fn zip<B>(self, other: Stream<B>) -> Stream<(A, B)>
    where
        B: Clone + 'static,
    {
        self.zip_with(other, |a, b| (a.clone(), b.clone()))
    }

    /// Pairs each element with its index.
    pub fn enumerate(self) -> Stream<(usize, A)> {
        iterate(0usize, |index| index + 1).zip(self)
    }
}

fn filter_shared<A, P>(stream: Stream<A>, predicate: Rc<P>) -> Stream<A>
where
    A: 'static,
    P: Fn(&A) -> bool + 'static,
{
    // Loop past rejected elements instead of recursing through them.
    let mut current = stream;
    loop {
        let next = match &current.node {
            Node::Empty => return Stream::empty(),
            Node::Cons(head, tail) => {
                if predicate(head.force()) {
                    let tail = tail.clone();
                    return Stream::from_suspensions(
                        head.clone(),
                        Suspension::new(move || filter_shared(tail.force().clone(), predicate)),
                    );
                }
                tail.force().clone()
            }
        };
        current = next;
    }
}

fn zip_with_shared<A, B, C, F>(left: Stream<A>, right: Stream<B>, f: Rc<F>) -> Stream<C>
where
    A: 'static,
    B: 'static,
    C: 'static,
    F: Fn(&A, &B) -> C + 'static,
{
    match (&left.node, &right.node) {
        (Node::Cons(left_head, left_tail), Node::Cons(right_head, right_tail)) => {
            let (left_head, right_head) = (left_head.clone(), right_head.clone());
            let (left_tail, right_tail) = (left_tail.clone(), right_tail.clone());
            let combine = Rc::clone(&f);
            Stream::cons(
                move || combine(left_head.force(), right_head.force()),
                move || zip_with_shared(left_tail.force().clone(), right_tail.force().clone(), f),
            )
        }
        _ => Stream::empty(),
    }
}

fn take_while_shared<A, P>(stream: Stream<A>, predicate: Rc<P>) -> Stream<A>
where
    A: 'static,
    P: Fn(&A) -> bool + 'static,
{
    match &stream.node {
        Node::Cons(head, tail) if predicate(head.force()) => {
            let tail = tail.clone();
            Stream::from_suspensions(
                head.clone(),
                Suspension::new(move || take_while_shared(tail.force().clone(), predicate)),
            )
        }
        _ => Stream::empty(),
    }
}

fn flat_map_shared<A, B, F>(stream: Stream<A>, f: Rc<F>) -> Stream<B>
where
    A: 'static,
    B: 'static,
    F: Fn(&A) -> Stream<B> + 'static,
{
    // Empty inner streams are skipped in a loop, like rejected elements in
    // `filter_shared`.
    let mut current = stream;
    loop {
        let next = match &current.node {
            Node::Empty => return Stream::empty(),
            Node::Cons(head, tail) => {
                let inner = f(head.force());
                if !inner.is_empty() {
                    let tail = tail.clone();
                    return inner.append_deferred(Suspension::new(move || {
                        flat_map_shared(tail.force().clone(), f)
                    }));
                }
                tail.force().clone()
            }
        };
        current = next;
    }
}

fn scan_shared<A, S, F>(stream: Stream<A>, acc: S, f: Rc<F>) -> Stream<S>
where
    A: 'static,
    S: Clone + 'static,
    F: Fn(&S, &A) -> S + 'static,
{
    match &stream.node {
        Node::Empty => Stream::empty(),
        Node::Cons(head, tail) => {
            let (head, tail) = (head.clone(), tail.clone());
            let step = Rc::clone(&f);
            let value = Suspension::new(move || step(&acc, head.force()));
            let running = value.clone();
            Stream::from_suspensions(
                value,
                Suspension::new(move || scan_shared(tail.force().clone(), running.force().clone(), f)),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{integers_from, repeat};
    use std::cell::Cell;

    fn counted_from(n: u64, forced: Rc<Cell<usize>>) -> Stream<u64> {
        let counter = Rc::clone(&forced);
        Stream::cons(
            move || {
                counter.set(counter.get() + 1);
                n
            },
            move || counted_from(n + 1, forced),
        )
    }

    fn finite(items: &[i32]) -> Stream<i32> {
        items.iter().copied().collect()
    }

    #[test]
    fn test_take() {
        assert_eq!(integers_from(1).take(5).to_vec(), vec![1, 2, 3, 4, 5]);
        assert!(integers_from(1).take(0).is_empty());
        assert_eq!(finite(&[1, 2]).take(10).to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_take_forces_nothing_at_construction() {
        let forced = Rc::new(Cell::new(0));
        let prefix = counted_from(1, Rc::clone(&forced)).take(3);
        assert_eq!(forced.get(), 0);

        assert_eq!(prefix.to_vec(), vec![1, 2, 3]);
        assert_eq!(forced.get(), 3);
    }

    #[test]
    fn test_take_does_not_force_tail_past_last_element() {
        let tails = Rc::new(Cell::new(0));
        let counter = Rc::clone(&tails);
        let stream = Stream::cons_value(1, move || {
            counter.set(counter.get() + 1);
            Stream::once(2)
        });

        assert_eq!(stream.take(1).to_vec(), vec![1]);
        assert_eq!(tails.get(), 0);
    }

    #[test]
    fn test_map_is_element_at_a_time() {
        let forced = Rc::new(Cell::new(0));
        let squares = counted_from(1, Rc::clone(&forced)).map(|x| x * x);
        assert_eq!(forced.get(), 0);

        assert_eq!(squares.nth(3), Some(16));
        assert_eq!(forced.get(), 1);
    }

    #[test]
    fn test_filter() {
        let evens = integers_from(1).filter(|x| x % 2 == 0);
        assert_eq!(evens.take(4).to_vec(), vec![2, 4, 6, 8]);
        assert!(finite(&[1, 3, 5]).filter(|x| x % 2 == 0).is_empty());
    }

    #[test]
    fn test_filter_skips_long_runs_without_recursion() {
        let far = integers_from(0).filter(|x| *x >= 1_000_000);
        assert_eq!(far.head(), Some(&1_000_000));
    }

    #[test]
    fn test_fused_pipeline_forces_only_what_it_needs() {
        let forced = Rc::new(Cell::new(0));
        let result = counted_from(1, Rc::clone(&forced))
            .map(|x| x * 2)
            .filter(|y| y % 4 == 0)
            .take(3)
            .to_vec();

        assert_eq!(result, vec![4, 8, 12]);
        assert_eq!(forced.get(), 6);
    }

    #[test]
    fn test_zip_and_zip_with() {
        let pairs = integers_from(1).zip(finite(&[10, 20, 30])).to_vec();
        assert_eq!(pairs, vec![(1, 10), (2, 20), (3, 30)]);

        let sums = integers_from(1).zip_with(repeat(100), |a, b| a + b);
        assert_eq!(sums.take(3).to_vec(), vec![101, 102, 103]);
    }

    #[test]
    fn test_take_while_and_skip_while() {
        let small = integers_from(1).take_while(|x| *x < 4);
        assert_eq!(small.to_vec(), vec![1, 2, 3]);

        let large = integers_from(1).skip_while(|x| *x < 4);
        assert_eq!(large.head(), Some(&4));
    }

    #[test]
    fn test_append_and_interleave() {
        assert_eq!(finite(&[1, 2]).append(finite(&[3])).to_vec(), vec![1, 2, 3]);
        assert_eq!(Stream::empty().append(finite(&[7])).to_vec(), vec![7]);

        let mixed = repeat(0).interleave(integers_from(1).map(|x| *x as i32));
        assert_eq!(mixed.take(6).to_vec(), vec![0, 1, 0, 2, 0, 3]);
    }

    #[test]
    fn test_append_defers_second_stream() {
        let forced = Rc::new(Cell::new(false));
        let flag = Rc::clone(&forced);
        let joined = finite(&[1]).append_deferred(Suspension::new(move || {
            flag.set(true);
            finite(&[2])
        }));

        assert_eq!(joined.head(), Some(&1));
        assert!(!forced.get());
        assert_eq!(joined.to_vec(), vec![1, 2]);
        assert!(forced.get());
    }

    #[test]
    fn test_flat_map() {
        let expanded = finite(&[1, 2, 3]).flat_map(|x| finite(&[*x, *x * 10]));
        assert_eq!(expanded.to_vec(), vec![1, 10, 2, 20, 3, 30]);

        let sparse = integers_from(0).flat_map(|x| {
            if x % 100_000 == 0 {
                Stream::once(*x)
            } else {
                Stream::empty()
            }
        });
        assert_eq!(sparse.take(3).to_vec(), vec![0, 100_000, 200_000]);
    }

    #[test]
    fn test_scan() {
        let running = finite(&[1, 2, 3, 4]).scan(0, |acc, x| acc + x);
        assert_eq!(running.to_vec(), vec![1, 3, 6, 10]);
    }

    #[test]
    fn test_enumerate() {
        let indexed = finite(&[5, 6]).enumerate().to_vec();
        assert_eq!(indexed, vec![(0, 5), (1, 6)]);
    }
}
