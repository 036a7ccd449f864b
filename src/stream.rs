//! Lazy pull-based element streams.
//!
//! A [`Stream`] is a demand-driven sequence: nothing is produced until the
//! consumer asks for the next element. Producer and consumer talk over a
//! pair of rendezvous channels — the consumer signals *next* or *stop* on a
//! control channel, and the producer replies with one element on the data
//! channel; closing the data channel is the end-of-sequence marker.
//!
//! Each source spawns one producer thread. Dropping a `Stream` (or calling
//! [`Stream::stop`]) closes the control channel, which terminates the
//! producer, so abandoned streams do not leak threads.
//!
//! Terminal operations come from the standard [`Iterator`] implementation
//! (`for_each`, `fold`, `count`, `collect`, ...); the [`Collector`] trait
//! adds the bulk-load protocol containers implement, such as
//! [`TreeMapCollector`](crate::tree::TreeMapCollector).
//!
//! # Examples
//!
//! ```rust
//! use ordmap::stream::Stream;
//!
//! // An infinite source: elements exist only on demand
//! let mut counter = 0;
//! let stream = Stream::supply(move || {
//!     counter += 1;
//!     counter
//! });
//!
//! let first_three: Vec<i32> = stream.take(3).collect();
//! assert_eq!(first_three, vec![1, 2, 3]);
//! ```

use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::thread;

/// Consumer-side demand signal.
enum Demand {
    Next,
    Stop,
}

/// A lazy pull-based stream of elements of type `T`.
///
/// Elements are produced one per demand by a dedicated producer thread.
/// The stream is consumed through its [`Iterator`] implementation; it ends
/// when the producer runs out of elements, or early when the consumer calls
/// [`stop`](Self::stop) or drops the stream.
pub struct Stream<T> {
    demand: SyncSender<Demand>,
    items: Receiver<T>,
}

/// Producer-side endpoint of the protocol.
struct Source<T> {
    demand: Receiver<Demand>,
    items: SyncSender<T>,
}

impl<T> Source<T> {
    /// Blocks until the consumer asks for the next element.
    ///
    /// Returns `false` when the consumer stopped or dropped the stream.
    fn wait_request(&self) -> bool {
        matches!(self.demand.recv(), Ok(Demand::Next))
    }

    /// Delivers one element; `false` when the consumer has gone away.
    fn send(&self, item: T) -> bool {
        self.items.send(item).is_ok()
    }
}

/// Creates a connected (consumer, producer) endpoint pair.
///
/// Both channels are rendezvous channels, so the producer can never run
/// ahead of demand.
fn endpoints<T>() -> (Stream<T>, Source<T>) {
    let (demand_sender, demand_receiver) = sync_channel(0);
    let (item_sender, item_receiver) = sync_channel(0);
    (
        Stream {
            demand: demand_sender,
            items: item_receiver,
        },
        Source {
            demand: demand_receiver,
            items: item_sender,
        },
    )
}

impl<T: Send + 'static> Stream<T> {
    /// Creates an infinite stream that calls the supplier once per demand.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::stream::Stream;
    ///
    /// let zeros: Vec<i32> = Stream::supply(|| 0).take(4).collect();
    /// assert_eq!(zeros, vec![0, 0, 0, 0]);
    /// ```
    #[must_use]
    pub fn supply<F>(mut supplier: F) -> Self
    where
        F: FnMut() -> T + Send + 'static,
    {
        let (stream, source) = endpoints();
        thread::spawn(move || {
            while source.wait_request() {
                if !source.send(supplier()) {
                    break;
                }
            }
        });
        stream
    }

    /// Creates an infinite stream of the seed and its repeated images under
    /// the generator function.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::stream::Stream;
    ///
    /// let powers: Vec<i32> = Stream::generate(1, |value| value * 2).take(5).collect();
    /// assert_eq!(powers, vec![1, 2, 4, 8, 16]);
    /// ```
    #[must_use]
    pub fn generate<F>(seed: T, mut generator: F) -> Self
    where
        F: FnMut(&T) -> T + Send + 'static,
    {
        let (stream, source) = endpoints();
        thread::spawn(move || {
            let mut current = seed;
            while source.wait_request() {
                let next = generator(&current);
                if !source.send(current) {
                    break;
                }
                current = next;
            }
        });
        stream
    }

    /// Creates a stream over the elements of any iterable.
    ///
    /// The iterable moves into the producer thread; elements are pulled
    /// from it one per demand, and its exhaustion ends the stream.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::stream::Stream;
    ///
    /// let doubled: Vec<i32> = Stream::from_iterator(1..=3).map(|value| value * 2).collect();
    /// assert_eq!(doubled, vec![2, 4, 6]);
    /// ```
    #[must_use]
    pub fn from_iterator<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = T> + Send + 'static,
    {
        let (stream, source) = endpoints();
        thread::spawn(move || {
            let mut iterator = iterable.into_iter();
            while source.wait_request() {
                match iterator.next() {
                    Some(item) => {
                        if !source.send(item) {
                            break;
                        }
                    }
                    None => break,
                }
            }
        });
        stream
    }
}

impl<T> Stream<T> {
    /// Stops the stream early, releasing the producer.
    ///
    /// Dropping the stream has the same effect; `stop` just makes the
    /// intent explicit at the call site.
    pub fn stop(self) {
        let _ = self.demand.send(Demand::Stop);
    }

    /// Drains the stream into a collector and returns the finished result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ordmap::stream::Stream;
    /// use ordmap::tree::TreeMapCollector;
    ///
    /// let stream = Stream::from_iterator(vec![(3, "three"), (1, "one")]);
    /// let map = stream.collect_with(TreeMapCollector::new());
    /// assert_eq!(map.keys(), vec![1, 3]);
    /// ```
    pub fn collect_with<C: Collector<T>>(self, mut collector: C) -> C::Output {
        for item in self {
            collector.supply(item);
        }
        collector.finish()
    }
}

impl<T> Iterator for Stream<T> {
    type Item = T;

    /// Signals demand and waits for the producer's reply.
    ///
    /// Returns `None` once the producer closes the data channel.
    fn next(&mut self) -> Option<T> {
        self.demand.send(Demand::Next).ok()?;
        self.items.recv().ok()
    }
}

// =============================================================================
// Collector
// =============================================================================

/// The bulk-load protocol: accepts elements one at a time and yields a
/// finished container on completion.
///
/// # Examples
///
/// ```rust
/// use ordmap::stream::{Collector, Stream};
///
/// struct Summer(i64);
///
/// impl Collector<i64> for Summer {
///     type Output = i64;
///
///     fn supply(&mut self, item: i64) {
///         self.0 += item;
///     }
///
///     fn finish(self) -> i64 {
///         self.0
///     }
/// }
///
/// let total = Stream::from_iterator(1..=4i64).collect_with(Summer(0));
/// assert_eq!(total, 10);
/// ```
pub trait Collector<T> {
    /// The finished container type.
    type Output;

    /// Accepts one element.
    fn supply(&mut self, item: T);

    /// Completes the collection and yields the result.
    fn finish(self) -> Self::Output;
}

// =============================================================================
// Tests
// =============================================================================
