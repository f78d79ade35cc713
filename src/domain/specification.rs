// ==========================================
// 机构餐饮管理平台 - 采购规格与站点/细分市场实体
// ==========================================
// 三级解析数据: 站点偏好 > 细分市场默认 > 全局默认规格
// 日期窗口语义: 半开区间 [effective_date, end_date)
// ==========================================

use crate::domain::ingredient::Ingredient;
use crate::domain::types::{MarketSegment, RecordStatus, Scope};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Site - 站点
// ==========================================

/// 站点（食堂/门店）, 解析时用于定位租户与细分市场
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub site_id: String,
    pub tenant_id: String,
    pub name: String,
    pub segment: MarketSegment,
    pub status: RecordStatus,
}

// ==========================================
// ProductSpecification - 采购规格
// ==========================================

/// 采购规格: 描述某食材的一种可采购品质/等级
///
/// 约定(外围系统不保证): 每食材至多一条 is_default=true 且 ACTIVE 的
/// 全局默认规格; 解析算法必须容忍违反, 按最小编号确定性选取
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSpecification {
    pub spec_id: String,
    pub ingredient_id: String,
    pub scope: Scope,
    pub name: String,
    /// 品质等级描述 (如 "US Fancy" / "一级")
    pub grade: Option<String>,
    pub is_default: bool,
    pub status: RecordStatus,
}

// ==========================================
// SegmentIngredientDefault - 细分市场默认
// ==========================================

/// 细分市场 + 食材 → 规格 的默认绑定 (第二层级)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentIngredientDefault {
    pub id: String,
    pub segment: MarketSegment,
    pub ingredient_id: String,
    pub spec_id: String,
    pub priority: i32,
    pub effective_date: NaiveDate,
    /// None = 长期有效
    pub end_date: Option<NaiveDate>,
    pub status: RecordStatus,
}

// ==========================================
// SiteIngredientPreference - 站点偏好
// ==========================================

/// 站点 + 食材 → 规格(+可选首选供应商) 的偏好绑定 (最高层级)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteIngredientPreference {
    pub id: String,
    pub site_id: String,
    pub ingredient_id: String,
    pub spec_id: String,
    pub vendor_id: Option<String>,
    pub priority: i32,
    pub effective_date: NaiveDate,
    /// None = 长期有效
    pub end_date: Option<NaiveDate>,
    pub status: RecordStatus,
}

// ==========================================
// ResolutionSnapshot - 解析快照
// ==========================================

/// 单次规格解析所需的全部候选数据
///
/// 由仓储层在**一个读事务**内装载, 保证三级查找读到一致的配置,
/// 避免管理端并发修改优先级/日期窗口造成撕裂结果
#[derive(Debug, Clone)]
pub struct ResolutionSnapshot {
    pub ingredient: Ingredient,
    pub site: Site,
    pub site_preferences: Vec<SiteIngredientPreference>,
    pub segment_defaults: Vec<SegmentIngredientDefault>,
    pub global_specifications: Vec<ProductSpecification>,
}
