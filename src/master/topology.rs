use serde::{Deserialize, Serialize};

/// One reducer and the workers reporting to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducerAssignment {
    pub reducer_id: u32,
    pub worker_ids: Vec<u32>,
}

/// Static assignment of workers to reducers, supplied by deployment
/// configuration. Which shard lives on which worker is decided elsewhere;
/// this only says who reports to whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub reducers: Vec<ReducerAssignment>,
}

impl Topology {
    pub fn worker_count(&self) -> usize {
        self.reducers.iter().map(|r| r.worker_ids.len()).sum()
    }

    pub fn reducer_of(&self, worker_id: u32) -> Option<u32> {
        self.reducers
            .iter()
            .find(|r| r.worker_ids.contains(&worker_id))
            .map(|r| r.reducer_id)
    }
}
