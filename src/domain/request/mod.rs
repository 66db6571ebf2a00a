//! Request aggregate and the approval workflow types that drive it to a
//! verdict.

mod approval_task;
mod policy;
mod request;

pub use approval_task::{ApprovalTask, ApproverRole, TaskDecision};
pub use policy::{ApprovalPolicy, ApprovalRule, ApprovalType, ApproverSpec, Verdict};
pub use request::{Request, RequestStatus};
