//! # Traversal
//!
//! Consumers that walk a stream. Every operation here that may visit the
//! whole stream is a loop: force the head, use it, replace the current cell
//! with the forced tail, repeat. Stack depth stays constant however long
//! the stream is.
//!
//! The one deliberate exception is [`Stream::fold_right`], whose combining
//! function decides how deep evaluation goes.

use std::rc::Rc;

use lazy_core::{ForceError, Suspension};
use tracing::debug;

use crate::stream::{Node, Stream};

impl<A: Clone> Stream<A> {
    /// Forces every element into a `Vec`, in order.
    ///
    /// The stream is consumed, so cells already visited are released as
    /// the walk proceeds unless another handle still holds them.
    ///
    /// # Panics
    ///
    /// Panics if a suspension is poisoned or cyclic; see
    /// [`try_to_vec`](Self::try_to_vec). Never returns on an infinite
    /// stream.
    #[must_use]
    pub fn to_vec(self) -> Vec<A> {
        match self.try_to_vec() {
            Ok(items) => items,
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`to_vec`](Self::to_vec), but reports forcing errors.
    pub fn try_to_vec(self) -> Result<Vec<A>, ForceError> {
        let mut items = Vec::new();
        let mut current = self;
        loop {
            let next = match &current.node {
                Node::Empty => break,
                Node::Cons(head, tail) => {
                    items.push(head.try_force()?.clone());
                    tail.try_force()?.clone()
                }
            };
            current = next;
        }
        debug!(elements = items.len(), "materialized stream");
        Ok(items)
    }

    /// The element at `index`, forcing only that head and the tails before it.
    ///
    /// # Scheme equivalent
    /// ```scheme
    /// (stream-ref s n)
    /// ```
    #[must_use]
    pub fn nth(&self, index: usize) -> Option<A> {
        match self.try_nth(index) {
            Ok(item) => item,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_nth(&self, index: usize) -> Result<Option<A>, ForceError> {
        let mut current = self.clone();
        for _ in 0..index {
            let next = match &current.node {
                Node::Empty => return Ok(None),
                Node::Cons(_, tail) => tail.try_force()?.clone(),
            };
            current = next;
        }
        match &current.node {
            Node::Empty => Ok(None),
            Node::Cons(head, _) => Ok(Some(head.try_force()?.clone())),
        }
    }

    /// The first element matching `predicate`.
    pub fn find<P>(self, mut predicate: P) -> Option<A>
    where
        P: FnMut(&A) -> bool,
    {
        self.into_iter().find(|item| predicate(item))
    }

    /// A std iterator over clones of the elements.
    #[must_use]
    pub fn iter(&self) -> StreamIter<A> {
        StreamIter {
            current: self.clone(),
        }
    }
}

impl<A> Stream<A> {
    /// Drops the first `n` elements, forcing tails but no heads.
    #[must_use]
    pub fn skip(self, n: usize) -> Stream<A> {
        let mut current = self;
        for _ in 0..n {
            match current.tail() {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Strict left fold.
    ///
    /// # Scheme equivalent
    /// ```scheme
    /// (fold-left f init s)
    /// ```
    pub fn fold_left<B, F>(self, init: B, mut f: F) -> B
    where
        F: FnMut(B, &A) -> B,
    {
        let mut acc = init;
        let mut current = self;
        loop {
            let next = match &current.node {
                Node::Empty => break,
                Node::Cons(head, tail) => {
                    acc = f(acc, head.force());
                    tail.force().clone()
                }
            };
            current = next;
        }
        acc
    }

    pub fn for_each<F>(self, mut f: F)
    where
        F: FnMut(&A),
    {
        self.fold_left((), |(), item| f(item));
    }

    /// Number of elements. Forces every tail but no heads.
    #[must_use]
    pub fn count(self) -> usize {
        let mut count = 0;
        let mut current = self;
        while let Some(next) = current.tail() {
            count += 1;
            current = next;
        }
        count
    }

    /// Stops at the first element that satisfies `predicate`.
    pub fn any<P>(self, mut predicate: P) -> bool
    where
        P: FnMut(&A) -> bool,
    {
        let mut current = self;
        loop {
            let next = match &current.node {
                Node::Empty => return false,
                Node::Cons(head, tail) => {
                    if predicate(head.force()) {
                        return true;
                    }
                    tail.force().clone()
                }
            };
            current = next;
        }
    }

    /// Stops at the first element that fails `predicate`.
    pub fn all<P>(self, mut predicate: P) -> bool
    where
        P: FnMut(&A) -> bool,
    {
        !self.any(|item| !predicate(item))
    }
}

impl<A: 'static> Stream<A> {
    /// Right fold with a lazy accumulator.
    ///
    /// `combine` receives the current element and the fold of the rest of
    /// the stream, both as unevaluated suspensions. Ignoring `rest` stops
    /// the fold, which makes it usable on infinite streams. Forcing `rest`
    /// recurses one level per element, so a combiner that always forces it
    /// needs the stream to be short; use [`fold_left`](Self::fold_left) or
    /// [`to_vec`](Self::to_vec) for long strict reductions.
    ///
    /// # Example
    /// ```
    /// use lazy_stream::sources::integers_from;
    ///
    /// // Terminates on an infinite stream: the rest is never forced once
    /// // the target is seen.
    /// let found = integers_from(1).fold_right(false, |item, rest| {
    ///     *item.force() == 4 || *rest.force()
    /// });
    /// assert!(found);
    /// ```
    pub fn fold_right<B, F>(self, init: B, combine: F) -> B
    where
        B: Clone + 'static,
        F: Fn(&Suspension<A>, Suspension<B>) -> B + 'static,
    {
        fold_right_shared(self, init, Rc::new(combine))
    }
}

fn fold_right_shared<A, B, F>(stream: Stream<A>, init: B, combine: Rc<F>) -> B
where
    A: 'static,
    B: Clone + 'static,
    F: Fn(&Suspension<A>, Suspension<B>) -> B + 'static,
{
    match &stream.node {
        Node::Empty => init,
        Node::Cons(head, tail) => {
            let tail = tail.clone();
            let rest_combine = Rc::clone(&combine);
            let rest_init = init.clone();
            let rest = Suspension::new(move || {
                fold_right_shared(tail.force().clone(), rest_init, rest_combine)
            });
            combine(head, rest)
        }
    }
}

/// Iterator returned by [`Stream::iter`] and `IntoIterator`.
///
/// Each call to `next` forces one head and one tail.
#[derive(Clone, Debug)]
pub struct StreamIter<A> {
    current: Stream<A>,
}

impl<A: Clone> Iterator for StreamIter<A> {
    type Item = A;

    fn next(&mut self) -> Option<Self::Item> {
        let (item, next) = match &self.current.node {
            Node::Empty => return None,
            Node::Cons(head, tail) => (head.force().clone(), tail.force().clone()),
        };
        self.current = next;
        Some(item)
    }
}

impl<A: Clone> IntoIterator for Stream<A> {
    type Item = A;
    type IntoIter = StreamIter<A>;

    fn into_iter(self) -> Self::IntoIter {
        StreamIter { current: self }
    }
}

impl<A: Clone> IntoIterator for &Stream<A> {
    type Item = A;
    type IntoIter = StreamIter<A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{integers_from, repeat};
    use std::cell::Cell;

    fn finite(items: &[i32]) -> Stream<i32> {
        items.iter().copied().collect()
    }

    #[test]
    fn test_to_vec_finite() {
        assert_eq!(finite(&[3, 1, 4]).to_vec(), vec![3, 1, 4]);
        assert!(Stream::<i32>::empty().to_vec().is_empty());
    }

    #[test]
    fn test_try_to_vec_reports_poisoned_head() {
        let poisoned: Suspension<i32> = Suspension::new(|| panic!("bad element"));
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = poisoned.force();
        }));

        let stream = Stream::from_suspensions(
            Suspension::evaluated(1),
            Suspension::evaluated(Stream::from_suspensions(
                poisoned,
                Suspension::evaluated(Stream::empty()),
            )),
        );
        assert_eq!(stream.try_to_vec(), Err(ForceError::Poisoned));
    }

    #[test]
    fn test_nth_and_skip() {
        let naturals = integers_from(0);
        assert_eq!(naturals.nth(0), Some(0));
        assert_eq!(naturals.nth(49), Some(49));
        assert_eq!(finite(&[1, 2]).nth(2), None);

        assert_eq!(naturals.clone().skip(10).head(), Some(&10));
        assert!(finite(&[1, 2]).skip(5).is_empty());
    }

    #[test]
    fn test_skip_forces_no_heads() {
        let forced = Rc::new(Cell::new(0));
        let counter = Rc::clone(&forced);
        let stream = integers_from(0).map(move |x| {
            counter.set(counter.get() + 1);
            *x
        });

        let rest = stream.skip(100);
        assert_eq!(forced.get(), 0);
        assert_eq!(rest.head(), Some(&100));
        assert_eq!(forced.get(), 1);
    }

    #[test]
    fn test_folds() {
        assert_eq!(finite(&[1, 2, 3, 4]).fold_left(0, |acc, x| acc + x), 10);

        let rendered = finite(&[1, 2, 3]).fold_right(String::from("nil"), |item, rest| {
            format!("({} . {})", item.force(), rest.force())
        });
        assert_eq!(rendered, "(1 . (2 . (3 . nil)))");
    }

    #[test]
    fn test_fold_right_short_circuits_on_infinite_stream() {
        let found = integers_from(1).fold_right(false, |item, rest| *item.force() == 3 || *rest.force());
        assert!(found);

        // A combiner that never looks at the rest ends after one element.
        let first = repeat(7).fold_right(0, |item, _rest| *item.force());
        assert_eq!(first, 7);
    }

    #[test]
    fn test_count_any_all_find() {
        assert_eq!(finite(&[5, 6, 7]).count(), 3);
        assert!(integers_from(0).any(|x| *x == 1_000));
        assert!(!finite(&[1, 3, 5]).any(|x| x % 2 == 0));
        assert!(finite(&[2, 4]).all(|x| x % 2 == 0));
        assert!(!integers_from(0).all(|x| *x < 10));
        assert_eq!(integers_from(1).find(|x| x % 7 == 0), Some(7));
    }

    #[test]
    fn test_for_each_visits_in_order() {
        let mut seen = Vec::new();
        finite(&[9, 8, 7]).for_each(|x| seen.push(*x));
        assert_eq!(seen, vec![9, 8, 7]);
    }

    #[test]
    fn test_iterator_integration() {
        let doubled: Vec<i64> = integers_from(1).iter().map(|x| x * 2).take(3).collect();
        assert_eq!(doubled, vec![2, 4, 6]);

        let stream = finite(&[1, 2, 3]);
        let total: i32 = (&stream).into_iter().sum();
        assert_eq!(total, 6);
        assert_eq!(stream.head(), Some(&1));
    }
}
