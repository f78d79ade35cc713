// ==========================================
// 机构餐饮管理平台 - 配方实体
// ==========================================
// 红线: 配方一经读入即视为不可变;
//       缩放只产生派生值对象, 绝不回写存储配方
// ==========================================

use crate::domain::types::{MeasureBasis, RecordStatus, Scope};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// Recipe - 配方
// ==========================================

/// 配方主数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub recipe_id: String,
    pub scope: Scope,
    pub name: String,
    /// 产量数值 (份数口径时即份数)
    pub yield_quantity: Decimal,
    pub yield_unit_id: String,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// RecipeIngredient - 配方行
// ==========================================

/// 配方食材行 (有序)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub recipe_ingredient_id: String,
    pub recipe_id: String,
    /// 行序号, 展示与计算按此排序
    pub seq_no: i32,
    pub ingredient_id: String,
    pub quantity: Decimal,
    pub unit_id: String,
    /// 计量口径: 毛料(AP) / 净料(EP)
    pub measure_basis: MeasureBasis,
}
