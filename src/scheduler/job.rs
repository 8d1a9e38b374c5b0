use std::cmp::Ordering;
use std::time::Instant;

pub(crate) type BoxedJob = Box<dyn FnOnce() + Send + 'static>;

/// An entry in the delayed-job min-heap, ordered by deadline and then by
/// insertion sequence so ties break in submission order.
pub(crate) struct DelayedJob {
    pub(crate) deadline: Instant,
    pub(crate) seq: u64,
    pub(crate) job: BoxedJob,
}

impl PartialEq for DelayedJob {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}
impl Eq for DelayedJob {}

impl Ord for DelayedJob {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the earliest deadline sorts first.
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for DelayedJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
