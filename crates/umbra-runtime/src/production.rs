use hashbrown::HashSet;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use umbra_geom::Coords;

use crate::error::PipelineError;

/// How a produced stream ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StreamEnd {
    Open,
    Completed,
    Failed,
    Aborted,
}

struct State {
    items: Vec<Coords>,
    unsent: HashSet<Coords>,
    sent: HashSet<Coords>,
    end: StreamEnd,
}

struct Stream {
    producer: &'static str,
    state: Mutex<State>,
    changed: Condvar,
}

impl Stream {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Producer side of a stream of chunk coordinates.
///
/// Each registered item is delivered at most once; completion delivers every
/// registered item that was never emitted.
#[derive(Clone)]
pub struct Output {
    stream: Arc<Stream>,
}

impl Output {
    pub fn new(producer: &'static str) -> Self {
        Self {
            stream: Arc::new(Stream {
                producer,
                state: Mutex::new(State {
                    items: Vec::new(),
                    unsent: HashSet::new(),
                    sent: HashSet::new(),
                    end: StreamEnd::Open,
                }),
                changed: Condvar::new(),
            }),
        }
    }

    pub fn producer(&self) -> &'static str {
        self.stream.producer
    }

    /// Declares an item that will be produced.
    pub fn register(&self, item: Coords) {
        let mut st = self.stream.lock();
        if st.end == StreamEnd::Open && !st.sent.contains(&item) {
            st.unsent.insert(item);
        }
    }

    /// Publishes a registered item. Unknown or already-sent items are ignored.
    pub fn emit(&self, item: Coords) -> bool {
        let mut st = self.stream.lock();
        if st.end != StreamEnd::Open || !st.unsent.remove(&item) {
            return false;
        }
        st.sent.insert(item);
        st.items.push(item);
        drop(st);
        self.stream.changed.notify_all();
        true
    }

    /// Flushes every unsent item and closes the stream.
    pub fn complete(&self) {
        let mut st = self.stream.lock();
        if st.end != StreamEnd::Open {
            return;
        }
        let mut rest: Vec<Coords> = st.unsent.drain().collect();
        rest.sort();
        for item in rest {
            st.sent.insert(item);
            st.items.push(item);
        }
        st.end = StreamEnd::Completed;
        drop(st);
        self.stream.changed.notify_all();
    }

    /// Closes the stream without flushing unsent items.
    pub fn close(&self, end: StreamEnd) {
        let mut st = self.stream.lock();
        if st.end != StreamEnd::Open {
            return;
        }
        st.unsent.clear();
        st.end = end;
        drop(st);
        self.stream.changed.notify_all();
    }

    pub fn end(&self) -> StreamEnd {
        self.stream.lock().end
    }

    pub fn emitted(&self) -> usize {
        self.stream.lock().items.len()
    }

    /// A new reader positioned at the start of the stream.
    pub fn subscribe(&self) -> Input {
        Input {
            stream: Arc::clone(&self.stream),
            cursor: 0,
        }
    }
}

/// Consumer side: a blocking, gap-free iterator over emitted items.
pub struct Input {
    stream: Arc<Stream>,
    cursor: usize,
}

impl Input {
    pub fn producer(&self) -> &'static str {
        self.stream.producer
    }

    /// Next item without blocking.
    pub fn try_next(&mut self) -> Option<Coords> {
        let st = self.stream.lock();
        let item = st.items.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(item)
    }

    pub fn end(&self) -> StreamEnd {
        self.stream.lock().end
    }

    /// Error describing why the stream ended early, if it did.
    pub fn failure(&self) -> Option<PipelineError> {
        match self.end() {
            StreamEnd::Open | StreamEnd::Completed => None,
            StreamEnd::Aborted => Some(PipelineError::Aborted),
            StreamEnd::Failed => Some(PipelineError::UpstreamFailed {
                stage: self.stream.producer,
            }),
        }
    }

    /// Blocks until the producer finishes and returns every item not yet read.
    pub fn wait_for_all(&mut self) -> Result<Vec<Coords>, PipelineError> {
        let mut st = self.stream.lock();
        while st.end == StreamEnd::Open {
            st = self
                .stream
                .changed
                .wait(st)
                .unwrap_or_else(PoisonError::into_inner);
        }
        let end = st.end;
        let rest = st.items[self.cursor.min(st.items.len())..].to_vec();
        self.cursor = st.items.len();
        drop(st);
        match end {
            StreamEnd::Failed => Err(PipelineError::UpstreamFailed {
                stage: self.stream.producer,
            }),
            StreamEnd::Aborted => Err(PipelineError::Aborted),
            _ => Ok(rest),
        }
    }
}

impl Iterator for Input {
    type Item = Coords;

    /// Blocks until an item is available or the stream closes.
    fn next(&mut self) -> Option<Coords> {
        let mut st = self.stream.lock();
        loop {
            if let Some(item) = st.items.get(self.cursor).copied() {
                self.cursor += 1;
                return Some(item);
            }
            if st.end != StreamEnd::Open {
                return None;
            }
            st = self
                .stream
                .changed
                .wait(st)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn emit_is_at_most_once() {
        let out = Output::new("test");
        let a = Coords::new(1, 0, 0);
        out.register(a);
        assert!(out.emit(a));
        assert!(!out.emit(a));
        assert!(!out.emit(Coords::new(9, 9, 9)));
        out.register(a);
        out.complete();
        let mut input = out.subscribe();
        assert_eq!(input.wait_for_all().unwrap(), vec![a]);
    }

    #[test]
    fn complete_flushes_unsent() {
        let out = Output::new("test");
        for x in 0..4 {
            out.register(Coords::new(x, 0, 0));
        }
        out.emit(Coords::new(2, 0, 0));
        out.complete();
        let items: Vec<Coords> = out.subscribe().collect();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0], Coords::new(2, 0, 0));
    }

    #[test]
    fn failed_close_does_not_flush() {
        let out = Output::new("gen");
        out.register(Coords::ZERO);
        out.close(StreamEnd::Failed);
        let mut input = out.subscribe();
        assert!(input.next().is_none());
        assert_eq!(
            input.wait_for_all(),
            Err(PipelineError::UpstreamFailed { stage: "gen" })
        );
    }

    #[test]
    fn reader_blocks_until_items_arrive() {
        let out = Output::new("test");
        let mut input = out.subscribe();
        let producer = out.clone();
        let h = thread::spawn(move || {
            for x in 0..3 {
                producer.register(Coords::new(x, 0, 0));
            }
            for x in 0..3 {
                producer.emit(Coords::new(x, 0, 0));
            }
            producer.complete();
        });
        let mut seen = Vec::new();
        while let Some(c) = input.next() {
            seen.push(c);
        }
        h.join().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(input.end(), StreamEnd::Completed);
    }
}
