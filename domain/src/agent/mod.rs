//! Agent domain module
//!
//! The vocabulary shared by all desk agents: roles, the fields they
//! exchange, the operations they run, and the results they report.

pub mod field;
pub mod operation;
pub mod result;
pub mod role;

pub use field::EntityField;
pub use operation::Operation;
pub use result::{AgentResult, ResultStatus};
pub use role::{AgentRole, DependencyEdge, EdgeKind, ROLE_TABLE, RoleSpec, declared_edges};
