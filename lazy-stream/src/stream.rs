//! # The Stream Type
//!
//! A [`Stream<A>`] is either empty or a cons cell whose head *and* tail are
//! both [`Suspension`]s. Building a cell never forces either one, which is
//! what lets a stream describe an infinite sequence: the rest of the
//! sequence exists only as a promise until a consumer asks for it.
//!
//! ```text
//!   Stream ──> Cons ┬─ head: Suspension<A>           (pending or evaluated)
//!                   └─ tail: Suspension<Stream<A>> ──> Cons ┬─ head
//!                                                           └─ tail ──> ...
//! ```
//!
//! Nodes are immutable once built. Only the suspensions inside them move
//! from pending to evaluated, so a `Stream` handle is cheap to clone and
//! every clone sees the same memoized elements.
//!
//! ## Scheme equivalents
//!
//! | Scheme               | Rust                         |
//! |----------------------|------------------------------|
//! | `the-empty-stream`   | [`Stream::empty`]            |
//! | `(cons-stream a b)`  | [`Stream::cons_value`]       |
//! | `(stream-car s)`     | [`Stream::head`]             |
//! | `(stream-cdr s)`     | [`Stream::tail`]             |
//! | `(stream-null? s)`   | [`Stream::is_empty`]         |

use std::fmt;
use std::mem;

use lazy_core::Suspension;

/// A lazy, memoized, possibly infinite sequence.
pub struct Stream<A> {
    pub(crate) node: Node<A>,
}

pub(crate) enum Node<A> {
    Empty,
    Cons(Suspension<A>, Suspension<Stream<A>>),
}

impl<A> Default for Node<A> {
    fn default() -> Self {
        Node::Empty
    }
}

impl<A> Stream<A> {
    /// The stream with no elements.
    #[must_use]
    pub fn empty() -> Self {
        Self { node: Node::Empty }
    }

    /// Builds a cell over existing suspensions without forcing them.
    ///
    /// Use this to share a head or tail that some other stream already
    /// holds, so both streams reuse one memoized value.
    #[must_use]
    pub fn from_suspensions(head: Suspension<A>, tail: Suspension<Stream<A>>) -> Self {
        Self {
            node: Node::Cons(head, tail),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.node, Node::Empty)
    }

    /// Forces and returns the first element.
    #[must_use]
    pub fn head(&self) -> Option<&A> {
        match &self.node {
            Node::Empty => None,
            Node::Cons(head, _) => Some(head.force()),
        }
    }

    /// Forces and returns everything after the first element.
    ///
    /// The head is not forced.
    #[must_use]
    pub fn tail(&self) -> Option<Stream<A>> {
        match &self.node {
            Node::Empty => None,
            Node::Cons(_, tail) => Some(tail.force().clone()),
        }
    }

    /// The raw suspensions of the first cell, neither of them forced.
    #[must_use]
    pub fn uncons(&self) -> Option<(&Suspension<A>, &Suspension<Stream<A>>)> {
        match &self.node {
            Node::Empty => None,
            Node::Cons(head, tail) => Some((head, tail)),
        }
    }
}

impl<A: 'static> Stream<A> {
    /// Wraps both computations in fresh suspensions and links them into a
    /// cell. Neither closure runs here, so this is O(1) however expensive
    /// they are, including when `tail` would build an infinite stream.
    ///
    /// # Example
    /// ```
    /// use lazy_stream::Stream;
    ///
    /// fn naturals(n: u64) -> Stream<u64> {
    ///     Stream::cons(move || n, move || naturals(n + 1))
    /// }
    ///
    /// assert_eq!(naturals(1).take(3).to_vec(), vec![1, 2, 3]);
    /// ```
    pub fn cons<H, T>(head: H, tail: T) -> Self
    where
        H: FnOnce() -> A + 'static,
        T: FnOnce() -> Stream<A> + 'static,
    {
        Self::from_suspensions(Suspension::new(head), Suspension::new(tail))
    }

    /// A cell with an already-known head and a deferred tail.
    ///
    /// # Scheme equivalent
    /// ```scheme
    /// (cons-stream a b)
    /// ```
    pub fn cons_value<T>(head: A, tail: T) -> Self
    where
        T: FnOnce() -> Stream<A> + 'static,
    {
        Self::from_suspensions(Suspension::evaluated(head), Suspension::new(tail))
    }

    /// A one-element stream.
    pub fn once(value: A) -> Self {
        Self::from_suspensions(
            Suspension::evaluated(value),
            Suspension::evaluated(Stream::empty()),
        )
    }
}

impl<A> Clone for Stream<A> {
    fn clone(&self) -> Self {
        let node = match &self.node {
            Node::Empty => Node::Empty,
            Node::Cons(head, tail) => Node::Cons(head.clone(), tail.clone()),
        };
        Self { node }
    }
}

impl<A> Default for Stream<A> {
    fn default() -> Self {
        Self::empty()
    }
}

// A forced chain of a million cells would otherwise be freed by a million
// nested destructor calls. Detach each uniquely owned tail before dropping
// it, so the chain is released in a loop.
impl<A> Drop for Stream<A> {
    fn drop(&mut self) {
        let mut node = mem::take(&mut self.node);
        while let Node::Cons(head, tail) = node {
            drop(head);
            node = match tail.into_value() {
                Some(mut next) => mem::take(&mut next.node),
                None => break,
            };
        }
    }
}

/// Shows the evaluated prefix without forcing anything: `?` marks a head
/// that has not been forced and `..` a tail that has not been forced.
impl<A: fmt::Debug> fmt::Debug for Stream<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        let mut current = self.clone();
        loop {
            let next = match &current.node {
                Node::Empty => break,
                Node::Cons(head, tail) => {
                    match head.peek() {
                        Some(value) => list.entry(value),
                        None => list.entry(&format_args!("?")),
                    };
                    match tail.peek() {
                        Some(next) => next.clone(),
                        None => {
                            list.entry(&format_args!(".."));
                            break;
                        }
                    }
                }
            };
            current = next;
        }
        list.finish()
    }
}
