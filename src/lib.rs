// ==========================================
// 机构餐饮管理平台 - 规格与成本核算引擎核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 平台内的采购规格解析与配方成本核算核心
// 边界: 认证/HTTP/界面/数据导入均由外围系统承担
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    MarketSegment, MeasureBasis, PricingStatus, RecordStatus, ResolutionTier, Scope, UnitFamily,
};

// 领域实体
pub use domain::{
    Ingredient, ProductSpecification, Recipe, RecipeIngredient, ResolutionSnapshot,
    SegmentIngredientDefault, Site, SiteIngredientPreference, UnitOfMeasure,
};

// 引擎
pub use engine::{
    CostEngine, CostReport, LineCost, LineCostIssue, ResolutionOutcome, ScaleEngine,
    ScaledRecipeView, SpecificationResolver, TenantScopeResolver, UnitConverter,
};

// API
pub use api::{CostingApi, ProcurementApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "机构餐饮管理平台 - 规格与成本核算引擎";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// 预编译检查
// ==========================================
