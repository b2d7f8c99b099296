//! Strict-priority FIFO lanes.

use std::collections::VecDeque;

use super::job::{JobId, Priority};

/// One FIFO lane per [`Priority`]; the head of the highest non-empty lane
/// is dispatched first.
#[derive(Debug, Default)]
pub(crate) struct PriorityLanes {
    lanes: [VecDeque<JobId>; 3],
}

impl PriorityLanes {
    pub(crate) fn push(&mut self, priority: Priority, id: JobId) {
        self.lanes[priority.lane()].push_back(id);
    }

    pub(crate) fn pop(&mut self) -> Option<JobId> {
        self.lanes.iter_mut().find_map(VecDeque::pop_front)
    }

    pub(crate) fn remove(&mut self, id: JobId) -> bool {
        for lane in &mut self.lanes {
            if let Some(pos) = lane.iter().position(|queued| *queued == id) {
                lane.remove(pos);
                return true;
            }
        }
        false
    }

    /// Number of jobs dispatched before `id`.
    pub(crate) fn position(&self, id: JobId) -> Option<usize> {
        let mut ahead = 0;
        for lane in &self.lanes {
            if let Some(pos) = lane.iter().position(|queued| *queued == id) {
                return Some(ahead + pos);
            }
            ahead += lane.len();
        }
        None
    }

    pub(crate) fn len(&self) -> usize {
        self.lanes.iter().map(VecDeque::len).sum()
    }

    pub(crate) fn drain(&mut self) -> Vec<JobId> {
        self.lanes.iter_mut().flat_map(|lane| lane.drain(..)).collect()
    }
}
