use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::job::Job;

/// Heap entry. Ordered so the max-heap surfaces the highest priority
/// first, then the earliest enqueue within a priority band. The push
/// sequence is the final tie-break, which keeps dispatch order fully
/// deterministic even when two enqueues share a millisecond.
#[derive(Debug)]
struct PendingJob {
    seq: u64,
    job: Job,
}

impl PendingJob {
    fn key(&self) -> (u8, i64, u64) {
        (self.job.priority, self.job.enqueue_ts, self.seq)
    }
}

impl PartialEq for PendingJob {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for PendingJob {}

impl PartialOrd for PendingJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingJob {
    fn cmp(&self, other: &Self) -> Ordering {
        self.job
            .priority
            .cmp(&other.job.priority)
            .then_with(|| other.job.enqueue_ts.cmp(&self.job.enqueue_ts))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue over pending jobs: priority descending, FIFO within a
/// priority band. Exclusively owns every pending job, retries included.
#[derive(Debug, Default)]
pub struct DispatchQueue {
    heap: BinaryHeap<PendingJob>,
    next_seq: u64,
}

impl DispatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, job: Job) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(PendingJob { seq, job });
    }

    /// Removes and returns the highest-priority, among-ties-earliest job.
    pub fn pop(&mut self) -> Option<Job> {
        self.heap.pop().map(|entry| entry.job)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn job(ext_id: u32, priority: u8, enqueue_ts: i64) -> Job {
        Job::new(ext_id, priority, 2, enqueue_ts)
    }

    #[test]
    fn pop_returns_highest_priority_first() {
        let mut queue = DispatchQueue::new();
        queue.push(job(1, 3, 10));
        queue.push(job(2, 9, 20));
        queue.push(job(3, 5, 5));

        assert_eq!(queue.pop().unwrap().ext_id, 2);
        assert_eq!(queue.pop().unwrap().ext_id, 3);
        assert_eq!(queue.pop().unwrap().ext_id, 1);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn ties_break_by_earliest_enqueue() {
        let mut queue = DispatchQueue::new();
        queue.push(job(1, 5, 300));
        queue.push(job(2, 5, 100));
        queue.push(job(3, 5, 200));

        let order: Vec<u32> = std::iter::from_fn(|| queue.pop().map(|j| j.ext_id)).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn same_millisecond_ties_preserve_push_order() {
        let mut queue = DispatchQueue::new();
        for ext_id in 1..=4 {
            queue.push(job(ext_id, 7, 50));
        }
        let order: Vec<u32> = std::iter::from_fn(|| queue.pop().map(|j| j.ext_id)).collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
    }

    #[test]
    fn pop_on_empty_is_none() {
        let mut queue = DispatchQueue::new();
        assert!(queue.is_empty());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn len_tracks_pushes_and_pops() {
        let mut queue = DispatchQueue::new();
        queue.push(job(1, 1, 0));
        queue.push(job(2, 2, 0));
        assert_eq!(queue.len(), 2);
        queue.pop();
        assert_eq!(queue.len(), 1);
    }

    proptest! {
        /// Popped sequence is always sorted by (priority desc, enqueue_ts asc).
        #[test]
        fn popped_order_is_sorted(entries in prop::collection::vec((1u8..=10, 0i64..10_000), 0..64)) {
            let mut queue = DispatchQueue::new();
            for (i, (priority, ts)) in entries.iter().enumerate() {
                queue.push(job(i as u32 + 1, *priority, *ts));
            }

            let mut previous: Option<(u8, i64)> = None;
            while let Some(j) = queue.pop() {
                if let Some((prev_priority, prev_ts)) = previous {
                    prop_assert!(
                        j.priority < prev_priority
                            || (j.priority == prev_priority && j.enqueue_ts >= prev_ts)
                    );
                }
                previous = Some((j.priority, j.enqueue_ts));
            }
        }
    }
}
