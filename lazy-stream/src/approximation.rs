//! # Successive Approximation
//!
//! Streams as a replacement for loop state: an iterative numeric process is
//! the stream of its successive guesses, and the consumer decides how far
//! to run it.
//!
//! ```text
//! pi_summands     1, -1/3, 1/5, -1/7, ...
//!   │ partial_sums, scale by 4
//!   ▼
//! pi_stream       4.0, 2.666, 3.466, 2.895, ...      (slow)
//!   │ euler_transform
//!   ▼
//!                 3.166, 3.133, 3.145, 3.139, ...    (faster)
//!   │ accelerated_sequence
//!   ▼
//!                 4.0, 3.166, 3.142, 3.14159, ...    (much faster)
//! ```

use crate::sources::{iterate, partial_sums, scale_stream, unfold};
use crate::stream::{Node, Stream};

/// Newton's successive guesses for `sqrt(x)`, starting from 1.0.
///
/// # Scheme equivalent
/// ```scheme
/// (define (sqrt-stream x)
///   (define guesses
///     (cons-stream 1.0 (stream-map (lambda (guess) (sqrt-improve guess x)) guesses)))
///   guesses)
/// ```
pub fn sqrt_stream(x: f64) -> Stream<f64> {
    iterate(1.0, move |guess| (guess + x / guess) / 2.0)
}

/// `1, -1/3, 1/5, -1/7, ...` whose sum is pi/4.
pub fn pi_summands() -> Stream<f64> {
    iterate((1.0_f64, 1.0_f64), |&(n, sign)| (n + 2.0, -sign)).map(|&(n, sign)| sign / n)
}

/// Partial sums of [`pi_summands`], scaled to approximate pi.
pub fn pi_stream() -> Stream<f64> {
    scale_stream(partial_sums(pi_summands()), 4.0)
}

/// Euler's transform for alternating series:
/// `S(n+1) - (S(n+1) - S(n))^2 / (S(n-1) - 2 S(n) + S(n+1))`.
///
/// Forces the first two tails of `s` to line up the three shifted copies.
pub fn euler_transform(s: Stream<f64>) -> Stream<f64> {
    let s1 = s.tail().unwrap_or_default();
    let s2 = s1.tail().unwrap_or_default();
    s.zip(s1).zip_with(s2, |&(a, b), &c| {
        let denominator = a - 2.0 * b + c;
        if denominator == 0.0 {
            c
        } else {
            c - (c - b).powi(2) / denominator
        }
    })
}

/// The first element of each row of the tableau `s, t(s), t(t(s)), ...`.
pub fn accelerated_sequence<T>(transform: T, s: Stream<f64>) -> Stream<f64>
where
    T: Fn(Stream<f64>) -> Stream<f64> + 'static,
{
    unfold(s, move |row: Stream<f64>| {
        let first = *row.head()?;
        Some((first, transform(row)))
    })
}

/// The first element within `tolerance` of its predecessor.
///
/// Returns `None` if the stream ends first; loops forever on an infinite
/// stream that never settles.
pub fn stream_limit(s: Stream<f64>, tolerance: f64) -> Option<f64> {
    let mut previous = *s.head()?;
    let mut current = s.tail()?;
    loop {
        let next = match &current.node {
            Node::Empty => return None,
            Node::Cons(head, tail) => {
                let guess = *head.force();
                if (guess - previous).abs() < tolerance {
                    return Some(guess);
                }
                previous = guess;
                tail.force().clone()
            }
        };
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_sqrt_stream_converges() {
        let guesses = sqrt_stream(2.0).take(5).to_vec();
        assert_eq!(guesses[0], 1.0);
        assert_eq!(guesses[1], 1.5);
        assert!((guesses[4] - 2.0_f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_stream_limit() {
        let root = stream_limit(sqrt_stream(2.0), 1e-4).unwrap();
        assert!((root - 2.0_f64.sqrt()).abs() < 1e-3);

        assert_eq!(stream_limit(Stream::once(1.0), 0.1), None);
        assert_eq!(stream_limit(Stream::empty(), 0.1), None);
    }

    #[test]
    fn test_stream_limit_stops_at_first_close_pair() {
        let guesses: Stream<f64> = vec![1.0, 5.0, 5.05, 5.06, 9.0].into_iter().collect();
        assert_eq!(stream_limit(guesses, 0.1), Some(5.05));

        let diverging: Stream<f64> = vec![1.0, 2.0, 4.0].into_iter().collect();
        assert_eq!(stream_limit(diverging, 0.5), None);
    }

    #[test]
    fn test_pi_stream_and_acceleration() {
        let plain = pi_stream().nth(7).unwrap();
        assert!((plain - PI).abs() < 0.2);

        let euler = euler_transform(pi_stream()).nth(7).unwrap();
        assert!((euler - PI).abs() < 0.01);

        let accelerated = accelerated_sequence(euler_transform, pi_stream()).nth(6).unwrap();
        assert!((accelerated - PI).abs() < 1e-9);
    }

    #[test]
    fn test_euler_transform_of_short_stream() {
        let short: Stream<f64> = vec![1.0, 2.0].into_iter().collect();
        assert!(euler_transform(short).is_empty());
    }
}
