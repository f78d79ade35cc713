// ==========================================
// 机构餐饮管理平台 - 配方成本 API
// ==========================================
// 职责: 配方成本核算、配方缩放
// 红线合规: 三态核价结果 (完整/部分/未核价), 不给单一成败信号
// 说明: 计算结果为值对象; 是否落为 calculated_cost 快照由调用方决定
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::ingredient::Ingredient;
use crate::domain::recipe::{Recipe, RecipeIngredient};
use crate::domain::types::PricingStatus;
use crate::engine::costing::{CostEngine, CostReport};
use crate::engine::scaling::{ScaleEngine, ScaledLine};
use crate::engine::units::UnitConverter;
use crate::i18n::{t, t_with_args};
use crate::repository::ingredient_repo::IngredientRepository;
use crate::repository::recipe_repo::RecipeRepository;
use crate::repository::unit_repo::UnitRepository;

// ==========================================
// CostResponse - 成本响应
// ==========================================

/// 供前端展示的配方成本结果 (已按货币精度舍入)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostResponse {
    pub recipe_id: String,
    pub recipe_name: String,
    pub yield_quantity: Decimal,
    pub total_cost: Decimal,
    pub cost_per_portion: Option<Decimal>,
    pub currency_scale: u32,
    pub pricing: PricingStatus,
    pub priced_lines: usize,
    pub line_count: usize,
    /// 本地化的核价状态结论
    pub message: String,
    /// 逐行成本明细 (问题行 cost=None 并携带 issue)
    pub report: CostReport,
}

// ==========================================
// ScaleResponse - 缩放响应
// ==========================================

/// 供前端展示的配方缩放结果 (派生值, 不可保存)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleResponse {
    pub recipe_id: String,
    pub recipe_name: String,
    pub source_yield_quantity: Decimal,
    pub target_yield: Decimal,
    pub scale_factor: Decimal,
    pub scaled_lines: Vec<ScaledLine>,
    pub cost: CostResponse,
}

// ==========================================
// CostingApi - 配方成本 API
// ==========================================

/// 配方成本API
///
/// 职责：
/// 1. 配方成本核算 (单位换算 + 出成率折算 + 行级局部恢复)
/// 2. 配方因子法缩放与缩放后成本
pub struct CostingApi {
    recipe_repo: Arc<RecipeRepository>,
    ingredient_repo: Arc<IngredientRepository>,
    unit_repo: Arc<UnitRepository>,
    config: Arc<ConfigManager>,
    cost_engine: CostEngine,
    scale_engine: ScaleEngine,
}

impl CostingApi {
    /// 创建新的CostingApi实例
    ///
    /// # 参数
    /// - recipe_repo: 配方仓储
    /// - ingredient_repo: 食材仓储
    /// - unit_repo: 计量单位仓储
    /// - config: 配置管理器
    pub fn new(
        recipe_repo: Arc<RecipeRepository>,
        ingredient_repo: Arc<IngredientRepository>,
        unit_repo: Arc<UnitRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            recipe_repo,
            ingredient_repo,
            unit_repo,
            config,
            cost_engine: CostEngine::new(),
            scale_engine: ScaleEngine::new(),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算配方成本
    ///
    /// # 返回
    /// - Ok(CostResponse): 舍入后的成本结果 (部分核价也是成功响应)
    /// - Err(NotFound): 配方不存在
    pub fn calculate_recipe_cost(&self, recipe_id: &str) -> ApiResult<CostResponse> {
        let (recipe, lines, ingredients, converter) = self.load_recipe_inputs(recipe_id)?;

        let report = self
            .cost_engine
            .calculate(&recipe, &lines, &ingredients, &converter);

        self.into_cost_response(&recipe, report)
    }

    /// 因子法缩放配方并核算缩放后成本
    ///
    /// # 参数
    /// - recipe_id: 配方编号
    /// - target_yield: 目标产量 (必须 > 0)
    ///
    /// # 返回
    /// - Ok(ScaleResponse): 缩放视图 (派生值, 不回写配方)
    /// - Err(InvalidTargetYield): 目标产量非正
    /// - Err(NotFound): 配方不存在
    pub fn scale_recipe(
        &self,
        recipe_id: &str,
        target_yield: Decimal,
    ) -> ApiResult<ScaleResponse> {
        let (recipe, lines, ingredients, converter) = self.load_recipe_inputs(recipe_id)?;

        let view = self
            .scale_engine
            .scale(&recipe, &lines, &ingredients, &converter, target_yield)?;

        let cost = self.into_cost_response(&recipe, view.cost.clone())?;

        Ok(ScaleResponse {
            recipe_id: view.recipe_id,
            recipe_name: recipe.name,
            source_yield_quantity: view.source_yield_quantity,
            target_yield: view.target_yield,
            scale_factor: view.scale_factor,
            scaled_lines: view.scaled_lines,
            cost,
        })
    }

    // ==========================================
    // 数据装配
    // ==========================================

    /// 装载成本计算输入: 配方 + 行 + 行引用的食材 + 单位换算表
    fn load_recipe_inputs(
        &self,
        recipe_id: &str,
    ) -> ApiResult<(
        Recipe,
        Vec<RecipeIngredient>,
        HashMap<String, Ingredient>,
        UnitConverter,
    )> {
        let recipe = self
            .recipe_repo
            .find_by_id(recipe_id)?
            .ok_or_else(|| {
                ApiError::NotFound(t_with_args(
                    "costing.recipe_not_found",
                    &[("recipe_id", recipe_id)],
                ))
            })?;

        let lines = self.recipe_repo.list_ingredients(recipe_id)?;

        let mut ingredient_ids: Vec<String> =
            lines.iter().map(|l| l.ingredient_id.clone()).collect();
        ingredient_ids.sort();
        ingredient_ids.dedup();

        let ingredients: HashMap<String, Ingredient> = self
            .ingredient_repo
            .list_by_ids(&ingredient_ids)?
            .into_iter()
            .map(|i| (i.ingredient_id.clone(), i))
            .collect();

        let converter = UnitConverter::new(self.unit_repo.list_all()?);

        debug!(
            recipe_id = %recipe_id,
            lines = lines.len(),
            ingredients = ingredients.len(),
            "成本计算输入装载完成"
        );

        Ok((recipe, lines, ingredients, converter))
    }

    /// 全精度报告 → 舍入响应 + 三态核价结论
    fn into_cost_response(&self, recipe: &Recipe, report: CostReport) -> ApiResult<CostResponse> {
        let scale = self
            .config
            .get_currency_scale()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        let rounded = report.rounded(scale);
        let pricing = rounded.pricing_status();
        let priced_lines = rounded.priced_line_count();
        let line_count = rounded.line_count();

        let message = match pricing {
            PricingStatus::FullyPriced => t("costing.fully_priced"),
            PricingStatus::PartiallyPriced { priced, total } => t_with_args(
                "costing.partially_priced",
                &[
                    ("priced", priced.to_string().as_str()),
                    ("total", total.to_string().as_str()),
                ],
            ),
            PricingStatus::Unpriced => t("costing.unpriced"),
        };

        Ok(CostResponse {
            recipe_id: rounded.recipe_id.clone(),
            recipe_name: recipe.name.clone(),
            yield_quantity: rounded.yield_quantity,
            total_cost: rounded.total_cost,
            cost_per_portion: rounded.cost_per_portion,
            currency_scale: scale,
            pricing,
            priced_lines,
            line_count,
            message,
            report: rounded,
        })
    }
}
