// ==========================================
// 机构餐饮管理平台 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL, 所有规则必须输出 reason
// 红线: 引擎只读取数据, 绝不回写配方/规格/偏好
// ==========================================

pub mod costing;
pub mod error;
pub mod resolution;
pub mod scaling;
pub mod scope;
pub mod units;

// 重导出核心引擎
pub use costing::{CostEngine, CostReport, LineCost, LineCostIssue};
pub use error::{EngineError, EngineResult};
pub use resolution::{ResolutionOutcome, SpecificationResolver};
pub use scaling::{ScaleEngine, ScaledLine, ScaledRecipeView};
pub use scope::{Scoped, TenantScopeResolver};
pub use units::{ConversionError, UnitConverter};
