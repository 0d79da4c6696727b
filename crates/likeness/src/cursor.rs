//! Pull-based, resumable child cursors.
//!
//! A [`Cursor`] walks an indexable [`Source`]. Sources buffer whatever they
//! have produced, so a cursor can be forked (the fork advances independently),
//! replayed from the start, or given back a single value with
//! [`Cursor::unshift`].

use std::rc::Rc;

use crate::error::Result;

/// An append-only sequence whose elements are produced on first access.
pub trait Source {
    type Item: Clone;

    /// Returns the element at `index`, producing it (and everything before
    /// it) if needed. `None` marks the end of the sequence.
    fn fetch(&self, index: usize) -> Result<Option<Self::Item>>;
}

/// A resumable position in a [`Source`].
pub struct Cursor<S: Source> {
    source: S,
    pos: usize,
    pending: Vec<S::Item>,
}

impl<S: Source + Clone> Clone for Cursor<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            pos: self.pos,
            pending: self.pending.clone(),
        }
    }
}

impl<S: Source> Cursor<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            pos: 0,
            pending: Vec::new(),
        }
    }

    /// Pulls the next value.
    pub fn pull(&mut self) -> Result<Option<S::Item>> {
        if let Some(item) = self.pending.pop() {
            return Ok(Some(item));
        }
        let item = self.source.fetch(self.pos)?;
        if item.is_some() {
            self.pos += 1;
        }
        Ok(item)
    }

    /// Pushes a value back; the next [`pull`](Self::pull) returns it.
    pub fn unshift(&mut self, item: S::Item) {
        self.pending.push(item);
    }

    /// Pulls the next value only if `accept` approves it.
    pub fn pull_if(&mut self, accept: impl Fn(&S::Item) -> bool) -> Result<Option<S::Item>> {
        match self.pull()? {
            Some(item) if accept(&item) => Ok(Some(item)),
            Some(item) => {
                self.unshift(item);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Drains the remaining values into a replayable recording.
    pub fn record(&mut self) -> Result<Cursor<Recorded<S::Item>>> {
        let mut items = Vec::new();
        while let Some(item) = self.pull()? {
            items.push(item);
        }
        Ok(Cursor::new(Recorded(Rc::from(items))))
    }
}

impl<S: Source + Clone> Cursor<S> {
    /// Branches without disturbing this cursor.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// A fresh cursor over the same source, from the first value.
    pub fn replay(&self) -> Self {
        Self::new(self.source.clone())
    }
}

/// A fully captured sequence.
#[derive(Debug)]
pub struct Recorded<T>(Rc<[T]>);

impl<T> Clone for Recorded<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> Recorded<T> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Clone> Source for Recorded<T> {
    type Item = T;

    fn fetch(&self, index: usize) -> Result<Option<T>> {
        Ok(self.0.get(index).cloned())
    }
}

impl<T: Clone> From<Vec<T>> for Cursor<Recorded<T>> {
    fn from(items: Vec<T>) -> Self {
        Cursor::new(Recorded(Rc::from(items)))
    }
}
