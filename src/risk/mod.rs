// Execution permission / risk mapping module
pub mod permission;

pub use permission::{
    BlockedBehavior, ExecutionMode, ExecutionPermission, HoldHorizon, PermissionMapper, SizeCap,
    TradePlaybook, ALL_BLOCKED,
};
