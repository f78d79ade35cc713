// ==========================================
// 机构餐饮管理平台 - 计量单位实体
// ==========================================
// 静态参考数据: 单位 → 单位族基准单位的线性换算系数
// ==========================================

use crate::domain::types::UnitFamily;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 计量单位
///
/// `to_base_factor` 表示 1 个本单位等于多少个"单位族基准单位"
/// (重量基准: 克, 体积基准: 毫升, 计数/单件基准: 1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOfMeasure {
    pub unit_id: String,
    pub name: String,
    pub family: UnitFamily,
    pub to_base_factor: Decimal,
}

impl UnitOfMeasure {
    pub fn new(
        unit_id: impl Into<String>,
        name: impl Into<String>,
        family: UnitFamily,
        to_base_factor: Decimal,
    ) -> Self {
        Self {
            unit_id: unit_id.into(),
            name: name.into(),
            family,
            to_base_factor,
        }
    }
}
