// ==========================================
// 机构餐饮管理平台 - 配方成本核算引擎
// ==========================================
// 红线: 无状态、无副作用、无 I/O 操作; 绝不改写配方数据
// 红线: 行级错误局部恢复 (问题行剔除并记录 issue, 整配方不失败)
// 红线: 中间计算保持 Decimal 全精度, 仅在报告边界按货币精度舍入
// ==========================================

use crate::domain::ingredient::Ingredient;
use crate::domain::recipe::{Recipe, RecipeIngredient};
use crate::domain::types::{MeasureBasis, PricingStatus, UnitFamily};
use crate::engine::units::{ConversionError, UnitConverter};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// 货币舍入档位 (报告边界用)
const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

// ==========================================
// LineCostIssue - 行级计价问题
// ==========================================

/// 行级计价问题 (局部恢复, 非致命)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineCostIssue {
    /// 行单位与食材常用单位不同族, 无法换算
    UnitIncompatible {
        line_unit: String,
        line_family: Option<UnitFamily>,
        common_unit: String,
        common_family: Option<UnitFamily>,
    },
    /// 出成率超出 (0,1]
    InvalidYieldPercent { yield_percent: String },
    /// 食材无成本数据 (直接成本与推导成本均缺失)
    MissingCost,
    /// 行引用的食材不存在
    UnknownIngredient,
    /// 行单位或常用单位不在换算表中
    UnknownUnit { unit_id: String },
    /// 单位换算系数非正 (参考数据错误)
    InvalidUnitFactor { unit_id: String },
}

// ==========================================
// LineCost - 行成本
// ==========================================

/// 单行成本结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineCost {
    pub recipe_ingredient_id: String,
    pub ingredient_id: String,
    pub seq_no: i32,
    /// 折算回采购口径(毛料)的常用单位数量
    pub as_purchased_quantity: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub issue: Option<LineCostIssue>,
}

impl LineCost {
    /// 该行是否成功计价
    pub fn is_priced(&self) -> bool {
        self.cost.is_some()
    }
}

// ==========================================
// CostReport - 成本报告
// ==========================================

/// 配方成本报告
///
/// total_cost / cost_per_portion 保持全精度,
/// 对外展示前调用 rounded() 按货币精度舍入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostReport {
    pub recipe_id: String,
    pub yield_quantity: Decimal,
    pub total_cost: Decimal,
    /// None = 配方产量非正, 无法折算每份成本
    pub cost_per_portion: Option<Decimal>,
    pub lines: Vec<LineCost>,
}

impl CostReport {
    /// 成功计价的行数
    pub fn priced_line_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_priced()).count()
    }

    /// 总行数
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// 核价状态 (完整/部分/未核价 三态)
    pub fn pricing_status(&self) -> PricingStatus {
        let total = self.line_count();
        let priced = self.priced_line_count();
        if priced == 0 {
            PricingStatus::Unpriced
        } else if priced == total {
            PricingStatus::FullyPriced
        } else {
            PricingStatus::PartiallyPriced { priced, total }
        }
    }

    /// 按货币精度舍入的报告副本 (报告边界专用)
    ///
    /// # 参数
    /// - scale: 小数位数 (货币通常为 2)
    pub fn rounded(&self, scale: u32) -> CostReport {
        CostReport {
            recipe_id: self.recipe_id.clone(),
            yield_quantity: self.yield_quantity,
            total_cost: self.total_cost.round_dp_with_strategy(scale, ROUNDING),
            cost_per_portion: self
                .cost_per_portion
                .map(|c| c.round_dp_with_strategy(scale, ROUNDING)),
            lines: self
                .lines
                .iter()
                .map(|l| LineCost {
                    recipe_ingredient_id: l.recipe_ingredient_id.clone(),
                    ingredient_id: l.ingredient_id.clone(),
                    seq_no: l.seq_no,
                    as_purchased_quantity: l.as_purchased_quantity,
                    cost: l.cost.map(|c| c.round_dp_with_strategy(scale, ROUNDING)),
                    issue: l.issue.clone(),
                })
                .collect(),
        }
    }
}

// ==========================================
// CostEngine - 成本核算引擎
// ==========================================

pub struct CostEngine {
    // 无状态引擎,不需要注入依赖
}

impl CostEngine {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算配方成本
    ///
    /// # 参数
    /// - recipe: 配方主数据 (只读)
    /// - lines: 配方食材行 (只读, 已按 seq_no 排序)
    /// - ingredients: 行引用的食材, 按 ingredient_id 索引
    /// - converter: 单位换算表
    ///
    /// # 返回
    /// 全精度成本报告; 问题行被剔除出合计并携带 issue
    pub fn calculate(
        &self,
        recipe: &Recipe,
        lines: &[RecipeIngredient],
        ingredients: &HashMap<String, Ingredient>,
        converter: &UnitConverter,
    ) -> CostReport {
        self.calculate_for_yield(
            &recipe.recipe_id,
            recipe.yield_quantity,
            lines,
            ingredients,
            converter,
        )
    }

    /// 按指定产量计算成本 (缩放引擎对缩放行复用本入口)
    ///
    /// # 规则
    /// 1. 行数量换算到食材常用单位 (跨族 → UNIT_INCOMPATIBLE, 剔除)
    /// 2. AP 口径直接用换算量; EP 口径除以出成率折回采购量
    /// 3. 出成率缺失按 1.0 处理; 超出 (0,1] → INVALID_YIELD_PERCENT, 剔除
    /// 4. 行成本 = 采购口径数量 × 有效单位成本
    /// 5. total = Σ 成功行; cost_per_portion = total / yield_quantity
    pub fn calculate_for_yield(
        &self,
        recipe_id: &str,
        yield_quantity: Decimal,
        lines: &[RecipeIngredient],
        ingredients: &HashMap<String, Ingredient>,
        converter: &UnitConverter,
    ) -> CostReport {
        let mut line_costs = Vec::with_capacity(lines.len());
        let mut total_cost = Decimal::ZERO;

        for line in lines {
            let line_cost = self.cost_line(line, ingredients, converter);
            if let Some(cost) = line_cost.cost {
                total_cost += cost;
            } else {
                warn!(
                    recipe_id = %recipe_id,
                    recipe_ingredient_id = %line.recipe_ingredient_id,
                    issue = ?line_cost.issue,
                    "配方行无法计价, 已从合计中剔除"
                );
            }
            line_costs.push(line_cost);
        }

        let cost_per_portion = if yield_quantity > Decimal::ZERO {
            Some(total_cost / yield_quantity)
        } else {
            None
        };

        debug!(
            recipe_id = %recipe_id,
            total_cost = %total_cost,
            priced = line_costs.iter().filter(|l| l.is_priced()).count(),
            lines = line_costs.len(),
            "配方成本计算完成"
        );

        CostReport {
            recipe_id: recipe_id.to_string(),
            yield_quantity,
            total_cost,
            cost_per_portion,
            lines: line_costs,
        }
    }

    /// 单行成本计算 (局部恢复: 任何问题都折叠为 issue, 不向外抛错)
    fn cost_line(
        &self,
        line: &RecipeIngredient,
        ingredients: &HashMap<String, Ingredient>,
        converter: &UnitConverter,
    ) -> LineCost {
        let unpriced = |issue: LineCostIssue| LineCost {
            recipe_ingredient_id: line.recipe_ingredient_id.clone(),
            ingredient_id: line.ingredient_id.clone(),
            seq_no: line.seq_no,
            as_purchased_quantity: None,
            cost: None,
            issue: Some(issue),
        };

        let ingredient = match ingredients.get(&line.ingredient_id) {
            Some(i) => i,
            None => return unpriced(LineCostIssue::UnknownIngredient),
        };

        // 步骤 1: 换算到食材常用单位
        let converted =
            match converter.convert(line.quantity, &line.unit_id, &ingredient.common_unit_id) {
                Ok(q) => q,
                Err(ConversionError::IncompatibleFamilies {
                    from_unit,
                    from_family,
                    to_unit,
                    to_family,
                }) => {
                    return unpriced(LineCostIssue::UnitIncompatible {
                        line_unit: from_unit,
                        line_family: Some(from_family),
                        common_unit: to_unit,
                        common_family: Some(to_family),
                    })
                }
                Err(ConversionError::UnknownUnit { unit_id }) => {
                    return unpriced(LineCostIssue::UnknownUnit { unit_id })
                }
                Err(ConversionError::InvalidConversionFactor { unit_id, .. }) => {
                    return unpriced(LineCostIssue::InvalidUnitFactor { unit_id })
                }
            };

        // 步骤 2/3: 计量口径折算 (EP → 除以出成率; 缺失按 1.0)
        let as_purchased = match line.measure_basis {
            MeasureBasis::AsPurchased => converted,
            MeasureBasis::EdiblePortion => {
                let yield_percent = ingredient.yield_percent.unwrap_or(Decimal::ONE);
                if yield_percent <= Decimal::ZERO || yield_percent > Decimal::ONE {
                    return unpriced(LineCostIssue::InvalidYieldPercent {
                        yield_percent: yield_percent.to_string(),
                    });
                }
                converted / yield_percent
            }
        };

        // 步骤 4: 行成本
        let cost_per_unit = match ingredient.effective_cost_per_common_unit() {
            Some(c) => c,
            None => return unpriced(LineCostIssue::MissingCost),
        };

        LineCost {
            recipe_ingredient_id: line.recipe_ingredient_id.clone(),
            ingredient_id: line.ingredient_id.clone(),
            seq_no: line.seq_no,
            as_purchased_quantity: Some(as_purchased),
            cost: Some(as_purchased * cost_per_unit),
            issue: None,
        }
    }
}

impl Default for CostEngine {
    fn default() -> Self {
        Self::new()
    }
}
