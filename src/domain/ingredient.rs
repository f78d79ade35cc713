// ==========================================
// 机构餐饮管理平台 - 食材实体
// ==========================================
// 生命周期: 由目录维护模块创建/编辑, 本引擎只读
// 供应商主数据由外围系统管理, 本引擎只引用 vendor_id
// ==========================================

use crate::domain::types::{RecordStatus, Scope};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// Ingredient - 食材
// ==========================================

/// 食材主数据
///
/// 成本口径: `cost_per_common_unit` 直接设定, 或由
/// `purchase_unit_cost / units_per_purchase_unit` 推导。
/// 出成率 `yield_percent` ∈ (0,1]; 缺失时计价阶段按 1.0 处理。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub ingredient_id: String,
    pub scope: Scope,
    pub name: String,
    /// 常用计量单位 (成本的计价单位)
    pub common_unit_id: String,
    /// 每常用单位成本 (直接设定值)
    pub cost_per_common_unit: Option<Decimal>,
    /// 采购单位成本 (推导成本的分子)
    pub purchase_unit_cost: Option<Decimal>,
    /// 每采购单位折合常用单位数 (推导成本的分母)
    pub units_per_purchase_unit: Option<Decimal>,
    /// 出成率 (净料/毛料)
    pub yield_percent: Option<Decimal>,
    /// 食材级首选供应商 (细分市场层级解析的供应商回退)
    pub preferred_vendor_id: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    /// 计算有效单位成本
    ///
    /// # 规则
    /// 1. cost_per_common_unit 存在 → 直接使用
    /// 2. 否则 purchase_unit_cost 与 units_per_purchase_unit 均存在
    ///    且分母 > 0 → purchase_unit_cost / units_per_purchase_unit
    /// 3. 否则 → None (该食材视为无成本数据)
    pub fn effective_cost_per_common_unit(&self) -> Option<Decimal> {
        if let Some(cost) = self.cost_per_common_unit {
            return Some(cost);
        }
        match (self.purchase_unit_cost, self.units_per_purchase_unit) {
            (Some(cost), Some(units)) if units > Decimal::ZERO => Some(cost / units),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn base_ingredient() -> Ingredient {
        Ingredient {
            ingredient_id: "ING001".to_string(),
            scope: Scope::Global,
            name: "胡萝卜".to_string(),
            common_unit_id: "LB".to_string(),
            cost_per_common_unit: None,
            purchase_unit_cost: None,
            units_per_purchase_unit: None,
            yield_percent: None,
            preferred_vendor_id: None,
            status: RecordStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_direct_cost_wins() {
        let mut ing = base_ingredient();
        ing.cost_per_common_unit = Some(Decimal::from_str("0.60").unwrap());
        ing.purchase_unit_cost = Some(Decimal::from_str("100").unwrap());
        ing.units_per_purchase_unit = Some(Decimal::from_str("50").unwrap());
        assert_eq!(
            ing.effective_cost_per_common_unit(),
            Some(Decimal::from_str("0.60").unwrap())
        );
    }

    #[test]
    fn test_derived_cost() {
        let mut ing = base_ingredient();
        // 每箱 30 元, 每箱折合 50 磅 → 0.6 元/磅
        ing.purchase_unit_cost = Some(Decimal::from_str("30").unwrap());
        ing.units_per_purchase_unit = Some(Decimal::from_str("50").unwrap());
        assert_eq!(
            ing.effective_cost_per_common_unit(),
            Some(Decimal::from_str("0.6").unwrap())
        );
    }

    #[test]
    fn test_zero_divisor_means_no_cost() {
        let mut ing = base_ingredient();
        ing.purchase_unit_cost = Some(Decimal::from_str("30").unwrap());
        ing.units_per_purchase_unit = Some(Decimal::ZERO);
        assert_eq!(ing.effective_cost_per_common_unit(), None);
    }
}
