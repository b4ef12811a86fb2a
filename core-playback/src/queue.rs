//! Play queue: ordered tracks plus a cursor.
//!
//! `PlayQueue` is plain data. The controller keeps it behind a single
//! `parking_lot::Mutex`, so every method here runs inside one critical
//! section and readers never see a cursor that disagrees with the tracks.
//!
//! Invariant: `cursor` is `None` exactly when the queue is empty, and
//! otherwise `Some(i)` with `i < len`.

use crate::track::Track;
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Default)]
pub struct PlayQueue {
    tracks: Vec<Track>,
    cursor: Option<usize>,
}

/// Result of removing an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub track: Track,
    /// The removed entry was the current one.
    pub was_current: bool,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|index| self.tracks.get(index))
    }

    /// Current entry together with its index.
    pub fn current_entry(&self) -> Option<(usize, Track)> {
        let index = self.cursor?;
        self.tracks.get(index).map(|track| (index, track.clone()))
    }

    pub fn has_next(&self) -> bool {
        matches!(self.cursor, Some(c) if c + 1 < self.tracks.len())
    }

    pub fn has_previous(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    /// Replace the queue wholesale.
    ///
    /// Returns `false` and leaves the queue untouched when `tracks` is
    /// empty. An out-of-range `start` falls back to 0.
    pub fn replace(&mut self, tracks: Vec<Track>, start: usize) -> bool {
        if tracks.is_empty() {
            return false;
        }

        let start = if start < tracks.len() { start } else { 0 };
        self.tracks = tracks;
        self.cursor = Some(start);
        true
    }

    /// Append to the end. Returns `true` when the queue was empty, in which
    /// case the new track became current.
    pub fn append(&mut self, track: Track) -> bool {
        self.tracks.push(track);
        if self.cursor.is_none() {
            self.cursor = Some(0);
            return true;
        }
        false
    }

    /// Insert right after the current entry. On an empty queue this behaves
    /// like [`append`](Self::append).
    pub fn insert_next(&mut self, track: Track) -> bool {
        match self.cursor {
            Some(c) => {
                self.tracks.insert(c + 1, track);
                false
            }
            None => self.append(track),
        }
    }

    /// Move the cursor forward by one. Returns the new index.
    pub fn advance(&mut self) -> Option<usize> {
        if !self.has_next() {
            return None;
        }
        let next = self.cursor.map_or(0, |c| c + 1);
        self.cursor = Some(next);
        Some(next)
    }

    /// Move the cursor back by one. Returns the new index.
    pub fn retreat(&mut self) -> Option<usize> {
        if !self.has_previous() {
            return None;
        }
        let previous = self.cursor.map_or(0, |c| c - 1);
        self.cursor = Some(previous);
        Some(previous)
    }

    /// Point the cursor at `index` if it exists.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.tracks.len() {
            return false;
        }
        self.cursor = Some(index);
        true
    }

    /// Move the cursor back to the first entry.
    pub fn rewind(&mut self) -> bool {
        self.jump_to(0)
    }

    /// Remove the entry at `index`.
    ///
    /// When the current entry is removed, whatever slides into its place
    /// becomes current; removing the last entry moves the cursor back one.
    pub fn remove_at(&mut self, index: usize) -> Option<Removal> {
        if index >= self.tracks.len() {
            return None;
        }

        let track = self.tracks.remove(index);
        let cursor = self.cursor.unwrap_or(0);
        let was_current = index == cursor;

        self.cursor = if self.tracks.is_empty() {
            None
        } else if index < cursor || (was_current && cursor >= self.tracks.len()) {
            Some(cursor - 1)
        } else {
            Some(cursor)
        };

        Some(Removal { track, was_current })
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.cursor = None;
    }

    /// Shuffle the queue. The current track moves to index 0 and stays
    /// current; every other entry is permuted.
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let Some(cursor) = self.cursor else {
            return;
        };

        let current = self.tracks.remove(cursor);
        self.tracks.shuffle(rng);
        self.tracks.insert(0, current);
        self.cursor = Some(0);
    }

    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::thread_rng());
    }

    /// Whether the cursor invariant holds.
    pub fn is_consistent(&self) -> bool {
        match self.cursor {
            None => self.tracks.is_empty(),
            Some(c) => c < self.tracks.len(),
        }
    }
}
