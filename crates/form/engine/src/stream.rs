//! Stream primitives the control tree is built on
//!
//! A [`State`] is a readable, writable and observable cell. A [`Source`] is
//! any boxed stream; every behavior attached to a control is expressed as
//! one. [`drive`] connects a source to a sink, delivering whatever is ready
//! immediately and handing the rest to the ambient tokio runtime.

use futures::future::{self, Future};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use futures::task::{noop_waker, Context, Poll};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio_stream::wrappers::WatchStream;

/// A boxed stream of values
pub type Source<T> = BoxStream<'static, T>;

/// A source that yields `value` once, immediately
pub fn just<T: Send + 'static>(value: T) -> Source<T> {
    stream::once(future::ready(value)).boxed()
}

/// A source that yields the output of `fut` once it resolves
pub fn deferred<F>(fut: F) -> Source<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    stream::once(fut).boxed()
}

/// Box an arbitrary stream as a source
pub fn from_stream<S>(source: S) -> Source<S::Item>
where
    S: Stream + Send + 'static,
{
    source.boxed()
}

/// A source that completes without yielding
pub fn empty<T: Send + 'static>() -> Source<T> {
    stream::empty().boxed()
}

/// Combine sources into a source of their latest values.
///
/// Emits each time any input emits, once every input has emitted at least
/// once. Position `i` of the output always holds the latest value of input
/// `i`. With no inputs the result completes immediately.
pub fn combine_latest<T>(sources: Vec<Source<T>>) -> Source<Vec<T>>
where
    T: Clone + Send + 'static,
{
    let len = sources.len();
    if len == 0 {
        return empty();
    }

    let indexed = sources
        .into_iter()
        .enumerate()
        .map(|(index, source)| source.map(move |value| (index, value)).boxed());

    let mut latest: Vec<Option<T>> = vec![None; len];
    stream::select_all(indexed)
        .filter_map(move |(index, value)| {
            latest[index] = Some(value);
            let combined = if latest.iter().all(Option::is_some) {
                Some(latest.iter().flatten().cloned().collect())
            } else {
                None
            };
            future::ready(combined)
        })
        .boxed()
}

struct Cell<T> {
    sender: Mutex<Option<watch::Sender<T>>>,
    receiver: watch::Receiver<T>,
}

/// A stateful, observable value.
///
/// Clones share the same cell. Once closed, writes are ignored, reads return
/// the last value and every observer stream completes.
pub struct State<T> {
    cell: Arc<Cell<T>>,
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> State<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        let (sender, receiver) = watch::channel(initial);
        Self {
            cell: Arc::new(Cell {
                sender: Mutex::new(Some(sender)),
                receiver,
            }),
        }
    }

    pub fn get(&self) -> T {
        self.cell.receiver.borrow().clone()
    }

    /// Read the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.receiver.borrow())
    }

    pub fn set(&self, value: T) {
        if let Some(sender) = self.cell.sender.lock().as_ref() {
            sender.send_replace(value);
        }
    }

    pub fn modify(&self, f: impl FnOnce(&mut T)) {
        if let Some(sender) = self.cell.sender.lock().as_ref() {
            sender.send_modify(f);
        }
    }

    /// Re-emit the current value to every observer
    pub fn notify(&self) {
        self.modify(|_| {});
    }

    /// Observe the value: yields the current value, then every change
    pub fn changes(&self) -> Source<T> {
        WatchStream::new(self.cell.receiver.clone()).boxed()
    }

    pub fn close(&self) {
        self.cell.sender.lock().take();
    }

    pub fn is_closed(&self) -> bool {
        self.cell.sender.lock().is_none()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("State").field(&*self.cell.receiver.borrow()).finish()
    }
}

/// Handle to a driven source. Dropping it cancels the source.
#[derive(Debug, Default)]
pub struct Subscription {
    task: Option<AbortHandle>,
}

impl Subscription {
    /// Whether part of the source still runs in the background
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Feed every value of `source` into `sink`.
///
/// Values that are ready now are delivered before this returns. If the
/// source is still pending afterwards, the remainder runs as a task on the
/// current tokio runtime; without a runtime it is dropped.
pub fn drive<T, F>(mut source: Source<T>, mut sink: F) -> Subscription
where
    T: Send + 'static,
    F: FnMut(T) + Send + 'static,
{
    let waker = noop_waker();
    let mut cx = Context::from_waker(&waker);
    loop {
        match source.poll_next_unpin(&mut cx) {
            Poll::Ready(Some(value)) => sink(value),
            Poll::Ready(None) => return Subscription::default(),
            Poll::Pending => break,
        }
    }

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            let task = handle.spawn(async move {
                while let Some(value) = source.next().await {
                    sink(value);
                }
            });
            Subscription {
                task: Some(task.abort_handle()),
            }
        }
        Err(_) => {
            tracing::warn!("Pending source dropped: no tokio runtime available");
            Subscription::default()
        }
    }
}

/// A slot holding at most one live subscription.
///
/// Switching to a new source cancels the previous one first.
#[derive(Debug, Default)]
pub struct Switch {
    current: Mutex<Option<Subscription>>,
}

impl Switch {
    pub fn switch_to<T, F>(&self, source: Source<T>, sink: F)
    where
        T: Send + 'static,
        F: FnMut(T) + Send + 'static,
    {
        self.cancel();
        let subscription = drive(source, sink);
        let previous = self.current.lock().replace(subscription);
        drop(previous);
    }

    pub fn cancel(&self) {
        let previous = self.current.lock().take();
        drop(previous);
    }

    pub fn is_active(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(Subscription::is_active)
    }
}
