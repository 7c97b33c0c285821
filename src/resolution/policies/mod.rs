mod policy;
mod suppression;
mod sync_plan;

pub use policy::Policy;
pub use suppression::{SuppressionMap, SuppressionStatus};
pub use sync_plan::{default_delta_threshold, SyncMode, SyncPlan, DELTA_SYNC_THRESHOLD_HOURS};
