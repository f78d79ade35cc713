// ==========================================
// 机构餐饮管理平台 - 领域层
// ==========================================
// 职责: 实体与类型定义, 不含数据访问与业务规则
// ==========================================

pub mod ingredient;
pub mod recipe;
pub mod specification;
pub mod types;
pub mod unit;

// 重导出领域实体
pub use ingredient::Ingredient;
pub use recipe::{Recipe, RecipeIngredient};
pub use specification::{
    ProductSpecification, ResolutionSnapshot, SegmentIngredientDefault, Site,
    SiteIngredientPreference,
};
pub use unit::UnitOfMeasure;
