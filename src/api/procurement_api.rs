// ==========================================
// 机构餐饮管理平台 - 采购规格 API
// ==========================================
// 职责: 规格解析查询、订货指南批量解析
// 红线合规: 可解释性 (解析结果携带逐条 reason)
// ==========================================

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::ResolutionTier;
use crate::engine::resolution::{ResolutionOutcome, SpecificationResolver};
use crate::i18n::{t, t_with_args};
use crate::repository::specification_repo::SpecificationRepository;
use chrono::NaiveDate;

// ==========================================
// ResolutionResponse - 解析响应
// ==========================================

/// 供前端展示的规格解析结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionResponse {
    pub ingredient_id: String,
    pub site_id: String,
    pub as_of_date: NaiveDate,
    pub tier: ResolutionTier,
    pub spec_id: Option<String>,
    pub spec_name: Option<String>,
    pub vendor_id: Option<String>,
    /// true = 三级均无命中, 界面需提示人工指定
    pub needs_manual: bool,
    /// 本地化的一句话结论
    pub message: String,
    /// 决策原因明细
    pub reasons: Vec<String>,
}

// ==========================================
// ProcurementApi - 采购规格 API
// ==========================================

/// 采购规格API
///
/// 职责：
/// 1. 单食材规格解析 (站点 > 细分市场 > 全局默认)
/// 2. 订货指南批量解析 (保持输入顺序, 支持协作式取消)
pub struct ProcurementApi {
    spec_repo: Arc<SpecificationRepository>,
    resolver: SpecificationResolver,
}

impl ProcurementApi {
    /// 创建新的ProcurementApi实例
    ///
    /// # 参数
    /// - spec_repo: 采购规格仓储
    pub fn new(spec_repo: Arc<SpecificationRepository>) -> Self {
        Self {
            spec_repo,
            resolver: SpecificationResolver::new(),
        }
    }

    /// 解析指定食材在指定站点、指定日期下适用的采购规格
    ///
    /// # 参数
    /// - ingredient_id: 食材编号
    /// - site_id: 站点编号
    /// - as_of_date: 解析基准日期
    ///
    /// # 返回
    /// - Ok(ResolutionResponse): 解析结果 (tier=NONE 也是成功响应)
    /// - Err(NotFound): 食材或站点不存在 (结构性错误)
    pub fn resolve_specification(
        &self,
        ingredient_id: &str,
        site_id: &str,
        as_of_date: NaiveDate,
    ) -> ApiResult<ResolutionResponse> {
        debug!(
            ingredient_id = %ingredient_id,
            site_id = %site_id,
            as_of = %as_of_date,
            "规格解析请求"
        );

        // 快照在仓储层单事务装载, 三级查找读到一致配置
        let snapshot = self
            .spec_repo
            .load_resolution_snapshot(ingredient_id, site_id)?;
        let outcome = self.resolver.resolve(&snapshot, as_of_date);

        self.into_response(outcome)
    }

    /// 订货指南批量解析
    ///
    /// # 参数
    /// - ingredient_ids: 食材编号列表 (响应保持该顺序)
    /// - site_id: 站点编号
    /// - as_of_date: 解析基准日期
    /// - cancel: 协作式取消标志 (每个食材装载前检查)
    ///
    /// # 返回
    /// - Ok(Vec<ResolutionResponse>): 与输入等长、同序的解析结果
    /// - Err(Cancelled): 调用方取消, 未完成的食材不再查找
    pub fn build_order_guide(
        &self,
        ingredient_ids: &[String],
        site_id: &str,
        as_of_date: NaiveDate,
        cancel: &AtomicBool,
    ) -> ApiResult<Vec<ResolutionResponse>> {
        info!(
            site_id = %site_id,
            count = ingredient_ids.len(),
            "订货指南批量解析"
        );

        let mut responses = Vec::with_capacity(ingredient_ids.len());
        for ingredient_id in ingredient_ids {
            if cancel.load(std::sync::atomic::Ordering::Relaxed) {
                return Err(ApiError::Cancelled);
            }

            let snapshot = self
                .spec_repo
                .load_resolution_snapshot(ingredient_id, site_id)?;
            let outcome = self
                .resolver
                .resolve_with_cancel(&snapshot, as_of_date, cancel)?;
            responses.push(self.into_response(outcome)?);
        }

        Ok(responses)
    }

    /// 解析结果 → 响应 (补规格名称与本地化结论)
    fn into_response(&self, outcome: ResolutionOutcome) -> ApiResult<ResolutionResponse> {
        let spec_name = match &outcome.spec_id {
            Some(spec_id) => self
                .spec_repo
                .find_spec_by_id(spec_id)?
                .map(|s| s.name),
            None => None,
        };

        let message = match outcome.tier {
            ResolutionTier::Site => t("resolution.resolved_site"),
            ResolutionTier::Segment => t("resolution.resolved_segment"),
            ResolutionTier::Global => t("resolution.resolved_global"),
            ResolutionTier::None => t_with_args(
                "resolution.needs_manual",
                &[("ingredient_id", outcome.ingredient_id.as_str())],
            ),
        };

        Ok(ResolutionResponse {
            needs_manual: outcome.needs_manual(),
            ingredient_id: outcome.ingredient_id,
            site_id: outcome.site_id,
            as_of_date: outcome.as_of_date,
            tier: outcome.tier,
            spec_id: outcome.spec_id,
            spec_name,
            vendor_id: outcome.vendor_id,
            message,
            reasons: outcome.reasons,
        })
    }
}
