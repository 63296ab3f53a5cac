//! Frame vocabulary shared by master, reducer and worker processes.
//!
//! One enum per connection direction; every role links the same definitions,
//! so the operation set stays a single closed enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::filter::FilterSpec;
use crate::domain::shop::Shop;

/// Correlates one client query with all of its sub-requests across the
/// cluster. Unique for the lifetime of the query.
pub type RequestId = u64;

/// One worker as addressed through a reducer: the logical worker holding the
/// shard, and the id of the replication listener its results arrive on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerRef {
    pub worker_id: u32,
    pub listener_id: u32,
}

/// A query operation with its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    Filter(FilterSpec),
    ShopCategorySales,
    ProductCategorySales,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Filter(_) => OperationKind::Filter,
            Operation::ShopCategorySales => OperationKind::ShopCategorySales,
            Operation::ProductCategorySales => OperationKind::ProductCategorySales,
        }
    }
}

/// Discriminant-only mirror of [`Operation`], used for merge dispatch and
/// logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    Filter,
    ShopCategorySales,
    ProductCategorySales,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Filter => "filter",
            OperationKind::ShopCategorySales => "shop_category_sales",
            OperationKind::ProductCategorySales => "product_category_sales",
        };
        f.write_str(name)
    }
}

/// Master → Reducer.
///
/// `Hello` opens the connection, the registration markers drive the worker
/// accept loop, and `Instruction` frames make up the steady state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MasterFrame {
    Hello {
        reducer_id: u32,
        worker_count: u32,
    },
    AddWorkerConnection,
    EndOfWorkers,
    Instruction {
        request_id: RequestId,
        op: Operation,
        targets: Vec<WorkerRef>,
    },
}

/// Reducer → Master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReducerFrame {
    Merged {
        reducer_id: u32,
        request_id: RequestId,
        result: MergedResult,
    },
}

/// Worker → Reducer on the replication connection; `Announce` is also the
/// opening frame of the Worker → Master connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkerFrame {
    Announce { worker_id: u32 },
    Partial {
        request_id: RequestId,
        result: PartialResult,
    },
}

/// Master → Worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkerInstruction {
    Execute {
        request_id: RequestId,
        op: Operation,
    },
}

/// One worker's contribution toward one query, one variant per operation
/// shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartialResult {
    Shops(Vec<Shop>),
    CategorySales(Vec<(String, u64)>),
}

/// The consolidated answer a reducer sends back for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MergedResult {
    Shops(Vec<Shop>),
    CategorySales {
        entries: Vec<(String, u64)>,
        total: u64,
    },
}
