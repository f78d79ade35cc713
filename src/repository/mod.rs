// ==========================================
// 机构餐饮管理平台 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod ingredient_repo;
pub mod recipe_repo;
pub mod site_repo;
pub mod specification_repo;
pub mod unit_repo;

mod row;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use ingredient_repo::IngredientRepository;
pub use recipe_repo::RecipeRepository;
pub use site_repo::SiteRepository;
pub use specification_repo::SpecificationRepository;
pub use unit_repo::UnitRepository;
