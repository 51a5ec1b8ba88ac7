//! Record arena with four intrusive lists.
//!
//! Every record the replacer tracks (alive or ghost) lives in one slot of a
//! `Vec`-backed arena and is addressed by a stable [`RecordId`]. Records
//! carry their own `prev`/`next` links, so each of the four ARC sequences is
//! just a `head`/`tail`/`len` triple over those links:
//!
//! ```text
//!   slots: Vec<Option<Record>>
//!   ┌────┬──────────────────────────────────────────────┐
//!   │ id │ Record { page, frame, status, prev, next }   │
//!   ├────┼──────────────────────────────────────────────┤
//!   │ 0  │ { P7, F2, Mru,      prev: None, next: 3 }    │
//!   │ 1  │ { P4, F0, MfuGhost, prev: None, next: None } │
//!   │ 3  │ { P9, F1, Mru,      prev: 0,    next: None } │
//!   └────┴──────────────────────────────────────────────┘
//!
//!   Mru:      head ─► [0] ◄──► [3] ◄── tail
//!   MfuGhost: head ─► [1] ◄── tail
//! ```
//!
//! Moving a record to the front of any list (including a different one)
//! is O(1) and never invalidates other handles, which is what lets the
//! alive-by-frame and ghost-by-page indices hold plain `RecordId`s.

use std::iter;
use std::ops::{Index, IndexMut};

use crate::buffer::replacer::ArcStatus;
use crate::common::{FrameId, PageId};

/// Stable handle to a record in [`RecordLists`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RecordId(usize);

/// Residency or ghost record.
///
/// For ghost records `frame_id` is the frame the page last occupied; it is
/// rebound when the page comes back.
#[derive(Debug)]
pub(crate) struct Record {
    pub page_id: PageId,
    pub frame_id: FrameId,
    pub evictable: bool,
    status: ArcStatus,
    prev: Option<RecordId>,
    next: Option<RecordId>,
}

impl Record {
    /// Which of the four lists currently holds this record.
    #[inline]
    pub fn status(&self) -> ArcStatus {
        self.status
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Links {
    head: Option<RecordId>,
    tail: Option<RecordId>,
    len: usize,
}

/// Arena of records plus the four ordered sequences threaded through it.
///
/// Front of a list is most recently touched; back is the next victim
/// (alive lists) or the oldest history (ghost lists).
#[derive(Debug)]
pub(crate) struct RecordLists {
    slots: Vec<Option<Record>>,
    free: Vec<usize>,
    lists: [Links; 4],
}

impl RecordLists {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            lists: [Links::default(); 4],
        }
    }

    /// Number of records in `status`'s list.
    #[inline]
    pub fn len(&self, status: ArcStatus) -> usize {
        self.lists[status.index()].len
    }

    /// Records in all four lists.
    pub fn total(&self) -> usize {
        self.lists.iter().map(|links| links.len).sum()
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    /// Allocate a record and link it at the front of `status`'s list.
    pub fn push_front(
        &mut self,
        status: ArcStatus,
        page_id: PageId,
        frame_id: FrameId,
        evictable: bool,
    ) -> RecordId {
        let record = Record {
            page_id,
            frame_id,
            evictable,
            status,
            prev: None,
            next: None,
        };
        let id = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(record);
                RecordId(idx)
            }
            None => {
                self.slots.push(Some(record));
                RecordId(self.slots.len() - 1)
            }
        };
        self.link_front(id, status);
        id
    }

    /// Detach `id` from its list and relink it at the front of `status`'s list.
    pub fn move_to_front(&mut self, id: RecordId, status: ArcStatus) {
        self.unlink(id);
        self.link_front(id, status);
    }

    /// Detach `id` and free its slot.
    pub fn remove(&mut self, id: RecordId) -> Option<Record> {
        self.get(id)?;
        self.unlink(id);
        let record = self.slots[id.0].take();
        self.free.push(id.0);
        record
    }

    /// Least recently touched record of `status`'s list.
    #[inline]
    pub fn back(&self, status: ArcStatus) -> Option<RecordId> {
        self.lists[status.index()].tail
    }

    /// Walk `status`'s list from front to back.
    pub fn iter_front(&self, status: ArcStatus) -> impl Iterator<Item = RecordId> + '_ {
        iter::successors(self.lists[status.index()].head, move |&id| self[id].next)
    }

    /// Walk `status`'s list from back to front.
    pub fn iter_back(&self, status: ArcStatus) -> impl Iterator<Item = RecordId> + '_ {
        iter::successors(self.lists[status.index()].tail, move |&id| self[id].prev)
    }

    fn link_front(&mut self, id: RecordId, status: ArcStatus) {
        let old_head = self.lists[status.index()].head;
        {
            let record = &mut self[id];
            record.status = status;
            record.prev = None;
            record.next = old_head;
        }
        match old_head {
            Some(head) => self[head].prev = Some(id),
            None => self.lists[status.index()].tail = Some(id),
        }
        let links = &mut self.lists[status.index()];
        links.head = Some(id);
        links.len += 1;
    }

    fn unlink(&mut self, id: RecordId) {
        let (prev, next, status) = {
            let record = &mut self[id];
            let links = (record.prev, record.next, record.status);
            record.prev = None;
            record.next = None;
            links
        };
        match prev {
            Some(prev) => self[prev].next = next,
            None => self.lists[status.index()].head = next,
        }
        match next {
            Some(next) => self[next].prev = prev,
            None => self.lists[status.index()].tail = prev,
        }
        self.lists[status.index()].len -= 1;
    }

    /// Check linkage of every list. Panics on corruption.
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let mut linked = 0;
        for status in ArcStatus::ALL {
            let links = self.lists[status.index()];
            let mut count = 0;
            let mut prev = None;
            let mut cursor = links.head;
            while let Some(id) = cursor {
                let record = &self[id];
                assert_eq!(record.status, status, "record in wrong list");
                assert_eq!(record.prev, prev, "broken back link in {:?}", status);
                prev = Some(id);
                cursor = record.next;
                count += 1;
                assert!(count <= self.slots.len(), "cycle in {:?}", status);
            }
            assert_eq!(links.tail, prev, "tail mismatch in {:?}", status);
            assert_eq!(links.len, count, "length mismatch in {:?}", status);
            linked += count;
        }
        let occupied = self.slots.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(linked, occupied, "unlinked records in arena");
        assert_eq!(
            occupied + self.free.len(),
            self.slots.len(),
            "free list out of sync"
        );
    }
}

impl Index<RecordId> for RecordLists {
    type Output = Record;

    fn index(&self, id: RecordId) -> &Record {
        match self.slots.get(id.0) {
            Some(Some(record)) => record,
            _ => panic!("stale record handle {:?}", id),
        }
    }
}

impl IndexMut<RecordId> for RecordLists {
    fn index_mut(&mut self, id: RecordId) -> &mut Record {
        match self.slots.get_mut(id.0) {
            Some(Some(record)) => record,
            _ => panic!("stale record handle {:?}", id),
        }
    }
}
