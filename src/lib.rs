// ParamQL - loose query params compiled into SQL WHERE condition trees
// This is the library root that exposes the public API

pub mod condition;
pub mod dialect;
pub mod param;
pub mod sql;

// Re-export commonly used types for convenience
pub use condition::builder::ConditionBuilder;
pub use condition::{ColumnType, Condition, Glue, Operator, ValidationError};
pub use dialect::Dialect;
pub use param::{escape_param, ParamValue, Scalar};
