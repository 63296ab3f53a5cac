use crate::protocol::message::{MergedResult, OperationKind, PartialResult};
use crate::reducer::errors::CoordinationError;

/// Combines all partial results of one request into the final answer.
///
/// Both merges are plain concatenation, commutative over the partials, so
/// delivery order never shows in the result beyond sequence order (which
/// carries no guarantee).
pub fn merge(
    kind: OperationKind,
    partials: Vec<PartialResult>,
) -> Result<MergedResult, CoordinationError> {
    match kind {
        OperationKind::Filter => {
            let mut shops = Vec::new();
            for partial in partials {
                match partial {
                    PartialResult::Shops(batch) => shops.extend(batch),
                    _ => return Err(CoordinationError::PartialShapeMismatch { kind }),
                }
            }
            Ok(MergedResult::Shops(shops))
        }
        OperationKind::ShopCategorySales | OperationKind::ProductCategorySales => {
            let mut entries = Vec::new();
            for partial in partials {
                match partial {
                    PartialResult::CategorySales(batch) => entries.extend(batch),
                    _ => return Err(CoordinationError::PartialShapeMismatch { kind }),
                }
            }
            let total = entries.iter().map(|(_, count)| count).sum();
            Ok(MergedResult::CategorySales { entries, total })
        }
    }
}
