// ==========================================
// 机构餐饮管理平台 - 配方缩放引擎
// ==========================================
// 职责: 因子法缩放 (scale_factor = 目标产量 / 配方产量)
// 红线: 缩放产生派生值对象 ScaledRecipeView, 结构上区别于
//       存储配方, 绝不回写; "另存为新配方"属外围系统操作
// ==========================================

use crate::domain::ingredient::Ingredient;
use crate::domain::recipe::{Recipe, RecipeIngredient};
use crate::domain::types::MeasureBasis;
use crate::engine::costing::{CostEngine, CostReport};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::units::UnitConverter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

// ==========================================
// ScaledLine - 缩放后的配方行
// ==========================================

/// 缩放后的配方行 (派生值, 非存储行)
///
/// 单位、计量口径、出成率均不随缩放变化, 只有数量乘以因子
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaledLine {
    pub recipe_ingredient_id: String,
    pub ingredient_id: String,
    pub seq_no: i32,
    pub quantity: Decimal,
    pub unit_id: String,
    pub measure_basis: MeasureBasis,
}

// ==========================================
// ScaledRecipeView - 缩放视图
// ==========================================

/// 配方缩放视图 (派生值对象)
///
/// 不携带配方状态/归属/时间戳等持久化字段,
/// 使其在类型层面无法被误当作可保存的 Recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaledRecipeView {
    pub recipe_id: String,
    pub source_yield_quantity: Decimal,
    pub target_yield: Decimal,
    pub scale_factor: Decimal,
    pub scaled_lines: Vec<ScaledLine>,
    /// 缩放行重新核算的成本报告
    pub cost: CostReport,
}

// ==========================================
// ScaleEngine - 缩放引擎
// ==========================================

pub struct ScaleEngine {
    cost_engine: CostEngine,
}

impl ScaleEngine {
    /// 构造函数
    pub fn new() -> Self {
        Self {
            cost_engine: CostEngine::new(),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 因子法缩放配方
    ///
    /// # 规则
    /// 1. target_yield <= 0 → InvalidTargetYield
    /// 2. 配方自身产量 <= 0 → InvalidRecipeYield (因子无定义)
    /// 3. scale_factor = target_yield / yield_quantity
    /// 4. 每行数量 × 因子; 单位/口径/出成率不变
    /// 5. 缩放行回灌成本引擎重新核算
    ///
    /// # 不变量 (可测试)
    /// 总成本与份数按同一因子缩放, 每份成本在舍入误差内不变
    pub fn scale(
        &self,
        recipe: &Recipe,
        lines: &[RecipeIngredient],
        ingredients: &HashMap<String, Ingredient>,
        converter: &UnitConverter,
        target_yield: Decimal,
    ) -> EngineResult<ScaledRecipeView> {
        if target_yield <= Decimal::ZERO {
            return Err(EngineError::InvalidTargetYield {
                target_yield: target_yield.to_string(),
            });
        }
        if recipe.yield_quantity <= Decimal::ZERO {
            return Err(EngineError::InvalidRecipeYield {
                recipe_id: recipe.recipe_id.clone(),
                yield_quantity: recipe.yield_quantity.to_string(),
            });
        }

        let scale_factor = target_yield / recipe.yield_quantity;

        debug!(
            recipe_id = %recipe.recipe_id,
            source_yield = %recipe.yield_quantity,
            target_yield = %target_yield,
            scale_factor = %scale_factor,
            "配方缩放"
        );

        // 构造缩放后的行集 (仅内存值, 不落库)
        let scaled_input: Vec<RecipeIngredient> = lines
            .iter()
            .map(|l| RecipeIngredient {
                recipe_ingredient_id: l.recipe_ingredient_id.clone(),
                recipe_id: l.recipe_id.clone(),
                seq_no: l.seq_no,
                ingredient_id: l.ingredient_id.clone(),
                quantity: l.quantity * scale_factor,
                unit_id: l.unit_id.clone(),
                measure_basis: l.measure_basis,
            })
            .collect();

        let cost = self.cost_engine.calculate_for_yield(
            &recipe.recipe_id,
            target_yield,
            &scaled_input,
            ingredients,
            converter,
        );

        let scaled_lines = scaled_input
            .into_iter()
            .map(|l| ScaledLine {
                recipe_ingredient_id: l.recipe_ingredient_id,
                ingredient_id: l.ingredient_id,
                seq_no: l.seq_no,
                quantity: l.quantity,
                unit_id: l.unit_id,
                measure_basis: l.measure_basis,
            })
            .collect();

        Ok(ScaledRecipeView {
            recipe_id: recipe.recipe_id.clone(),
            source_yield_quantity: recipe.yield_quantity,
            target_yield,
            scale_factor,
            scaled_lines,
            cost,
        })
    }
}

impl Default for ScaleEngine {
    fn default() -> Self {
        Self::new()
    }
}
