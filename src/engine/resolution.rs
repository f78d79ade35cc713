// ==========================================
// 机构餐饮管理平台 - 规格解析链引擎
// ==========================================
// 职责: 站点偏好 > 细分市场默认 > 全局默认规格 的三级级联解析
// 红线: 无状态、无副作用、无 I/O 操作; 所有规则必须输出 reason
// 红线: 三级候选数据必须来自单个读事务装载的快照 (见仓储层)
// ==========================================
// 层级责任链: 每级为独立的解析函数, 返回 Option<TierMatch>,
// 按序求值, 命中即短路; 新增层级只需在链上追加
// ==========================================

use crate::domain::specification::{
    ProductSpecification, ResolutionSnapshot, SegmentIngredientDefault, SiteIngredientPreference,
};
use crate::domain::types::ResolutionTier;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::scope::TenantScopeResolver;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::atomic::{self, AtomicBool};
use tracing::{debug, warn};

// ==========================================
// ResolutionOutcome - 解析结果
// ==========================================

/// 单次规格解析的结果
///
/// tier=NONE 是正常业务结果(新食材尚无采购数据), 不是错误;
/// 调用方必须按"需人工指定"处理
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    pub ingredient_id: String,
    pub site_id: String,
    pub as_of_date: NaiveDate,
    pub spec_id: Option<String>,
    pub vendor_id: Option<String>,
    pub tier: ResolutionTier,
    /// 决策原因 (每条规则命中/跳过的解释)
    pub reasons: Vec<String>,
}

impl ResolutionOutcome {
    /// 是否需要人工指定规格
    pub fn needs_manual(&self) -> bool {
        self.tier == ResolutionTier::None
    }
}

/// 单个层级的命中结果
struct TierMatch {
    spec_id: String,
    vendor_id: Option<String>,
    tier: ResolutionTier,
}

/// 层级解析函数签名 (责任链的链节)
type TierResolver =
    fn(&SpecificationResolver, &ResolutionSnapshot, NaiveDate, &mut Vec<String>) -> Option<TierMatch>;

// ==========================================
// SpecificationResolver - 规格解析引擎
// ==========================================

pub struct SpecificationResolver {
    scope_resolver: TenantScopeResolver,
}

impl SpecificationResolver {
    /// 构造函数
    pub fn new() -> Self {
        Self {
            scope_resolver: TenantScopeResolver::new(),
        }
    }

    /// 层级责任链 (求值顺序即优先级顺序)
    const TIER_CHAIN: [TierResolver; 3] = [
        Self::resolve_site_tier,
        Self::resolve_segment_tier,
        Self::resolve_global_tier,
    ];

    // ==========================================
    // 核心方法
    // ==========================================

    /// 解析指定食材在指定站点、指定日期下适用的采购规格
    ///
    /// # 参数
    /// - snapshot: 单事务装载的候选数据快照
    /// - as_of_date: 解析基准日期
    ///
    /// # 返回
    /// 解析结果 (三级均无命中时 tier=NONE, 不报错)
    pub fn resolve(&self, snapshot: &ResolutionSnapshot, as_of_date: NaiveDate) -> ResolutionOutcome {
        // 解析不可取消时等价于持常 false 标志
        let never_cancelled = AtomicBool::new(false);
        self.resolve_with_cancel(snapshot, as_of_date, &never_cancelled)
            .expect("未取消的解析不会返回 Cancelled")
    }

    /// 带协作式取消的解析
    ///
    /// # 规则
    /// 每个层级求值前检查取消标志; 已取消则停止后续层级查找,
    /// 返回 EngineError::Cancelled (结果将被调用方丢弃, 不再浪费查找)
    pub fn resolve_with_cancel(
        &self,
        snapshot: &ResolutionSnapshot,
        as_of_date: NaiveDate,
        cancel: &AtomicBool,
    ) -> EngineResult<ResolutionOutcome> {
        let mut reasons = Vec::new();

        for tier_resolver in Self::TIER_CHAIN {
            if cancel.load(atomic::Ordering::Relaxed) {
                debug!(
                    ingredient_id = %snapshot.ingredient.ingredient_id,
                    site_id = %snapshot.site.site_id,
                    "解析被取消, 停止后续层级查找"
                );
                return Err(EngineError::Cancelled);
            }

            if let Some(hit) = tier_resolver(self, snapshot, as_of_date, &mut reasons) {
                debug!(
                    ingredient_id = %snapshot.ingredient.ingredient_id,
                    site_id = %snapshot.site.site_id,
                    tier = %hit.tier,
                    spec_id = %hit.spec_id,
                    "规格解析命中"
                );
                return Ok(ResolutionOutcome {
                    ingredient_id: snapshot.ingredient.ingredient_id.clone(),
                    site_id: snapshot.site.site_id.clone(),
                    as_of_date,
                    spec_id: Some(hit.spec_id),
                    vendor_id: hit.vendor_id,
                    tier: hit.tier,
                    reasons,
                });
            }
        }

        // 三级耗尽: 正常业务结果, 需人工指定
        reasons.push("NONE: 三级解析均无命中, 需人工指定规格".to_string());
        Ok(ResolutionOutcome {
            ingredient_id: snapshot.ingredient.ingredient_id.clone(),
            site_id: snapshot.site.site_id.clone(),
            as_of_date,
            spec_id: None,
            vendor_id: None,
            tier: ResolutionTier::None,
            reasons,
        })
    }

    // ==========================================
    // 层级 1: 站点偏好
    // ==========================================

    /// 站点偏好层级解析
    ///
    /// # 规则
    /// 1. 候选: 状态 ACTIVE 且 effective_date <= as_of < end_date
    ///    (end_date 为 NULL 视为长期有效)
    /// 2. 选取: priority 最大; 平手取 effective_date 最近; 再平手取最小 id
    /// 3. 命中行自带首选供应商
    fn resolve_site_tier(
        &self,
        snapshot: &ResolutionSnapshot,
        as_of_date: NaiveDate,
        reasons: &mut Vec<String>,
    ) -> Option<TierMatch> {
        let candidates: Vec<&SiteIngredientPreference> = snapshot
            .site_preferences
            .iter()
            .filter(|p| window_contains(p.effective_date, p.end_date, as_of_date))
            .collect();

        if candidates.is_empty() {
            reasons.push(format!(
                "SITE: 无生效的站点偏好 (候选 {} 行, 基准日 {})",
                snapshot.site_preferences.len(),
                as_of_date
            ));
            return None;
        }

        let best = candidates
            .into_iter()
            .min_by(|a, b| compare_candidates(a.priority, a.effective_date, &a.id, b.priority, b.effective_date, &b.id))
            .expect("非空候选集必有最优行");

        reasons.push(format!(
            "SITE: 命中站点偏好 id={}, priority={}, effective={}",
            best.id, best.priority, best.effective_date
        ));

        Some(TierMatch {
            spec_id: best.spec_id.clone(),
            vendor_id: best.vendor_id.clone(),
            tier: ResolutionTier::Site,
        })
    }

    // ==========================================
    // 层级 2: 细分市场默认
    // ==========================================

    /// 细分市场默认层级解析
    ///
    /// # 规则
    /// 与站点层级相同的优先级/日期选取; 本层级不含供应商绑定,
    /// 回退到食材级首选供应商 (如有)
    fn resolve_segment_tier(
        &self,
        snapshot: &ResolutionSnapshot,
        as_of_date: NaiveDate,
        reasons: &mut Vec<String>,
    ) -> Option<TierMatch> {
        let candidates: Vec<&SegmentIngredientDefault> = snapshot
            .segment_defaults
            .iter()
            .filter(|d| window_contains(d.effective_date, d.end_date, as_of_date))
            .collect();

        if candidates.is_empty() {
            reasons.push(format!(
                "SEGMENT: 细分市场 {} 无生效的默认绑定 (候选 {} 行)",
                snapshot.site.segment,
                snapshot.segment_defaults.len()
            ));
            return None;
        }

        let best = candidates
            .into_iter()
            .min_by(|a, b| compare_candidates(a.priority, a.effective_date, &a.id, b.priority, b.effective_date, &b.id))
            .expect("非空候选集必有最优行");

        reasons.push(format!(
            "SEGMENT: 命中细分市场默认 id={}, segment={}, priority={}",
            best.id, best.segment, best.priority
        ));

        let vendor_id = snapshot.ingredient.preferred_vendor_id.clone();
        if let Some(v) = &vendor_id {
            reasons.push(format!("SEGMENT: 供应商回退到食材级首选 vendor_id={}", v));
        }

        Some(TierMatch {
            spec_id: best.spec_id.clone(),
            vendor_id,
            tier: ResolutionTier::Segment,
        })
    }

    // ==========================================
    // 层级 3: 全局默认规格
    // ==========================================

    /// 全局默认规格层级解析
    ///
    /// # 规则
    /// 1. 候选: 该食材 is_default=true 且 ACTIVE 的规格,
    ///    过滤为站点租户可见, 且租户私有优先于平台级
    /// 2. 候选多于一条属数据质量违规: 不报错, 取最小 spec_id
    ///    确定性选取, 记 warn 日志并输出原因
    fn resolve_global_tier(
        &self,
        snapshot: &ResolutionSnapshot,
        _as_of_date: NaiveDate,
        reasons: &mut Vec<String>,
    ) -> Option<TierMatch> {
        let defaults: Vec<&ProductSpecification> = snapshot
            .global_specifications
            .iter()
            .filter(|s| s.is_default)
            .collect();

        let visible: Vec<&ProductSpecification> = defaults
            .into_iter()
            .filter(|s| {
                self.scope_resolver
                    .is_visible(&s.scope, &snapshot.site.tenant_id)
            })
            .collect();
        let mut candidates = self.scope_resolver.prefer_tenant_owned(visible);

        if candidates.is_empty() {
            reasons.push("GLOBAL: 该食材无可见的默认规格".to_string());
            return None;
        }

        if candidates.len() > 1 {
            warn!(
                ingredient_id = %snapshot.ingredient.ingredient_id,
                count = candidates.len(),
                "存在多条全局默认规格, 按最小 spec_id 确定性选取"
            );
            reasons.push(format!(
                "GLOBAL: AMBIGUOUS_DEFAULT, {} 条默认规格, 取最小 spec_id",
                candidates.len()
            ));
        }

        candidates.sort_by(|a, b| a.spec_id.cmp(&b.spec_id));
        let best = candidates[0];

        reasons.push(format!("GLOBAL: 命中全局默认规格 spec_id={}", best.spec_id));

        Some(TierMatch {
            spec_id: best.spec_id.clone(),
            vendor_id: None,
            tier: ResolutionTier::Global,
        })
    }
}

impl Default for SpecificationResolver {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 选取规则 (层级内共用)
// ==========================================

/// 日期窗口判定: 半开区间 [effective_date, end_date)
///
/// end_date <= as_of 的过期行必须排除, 即使其 priority 更高
fn window_contains(
    effective_date: NaiveDate,
    end_date: Option<NaiveDate>,
    as_of_date: NaiveDate,
) -> bool {
    if effective_date > as_of_date {
        return false;
    }
    match end_date {
        Some(end) => as_of_date < end,
        None => true,
    }
}

/// 候选行排序键: priority 降序 → effective_date 降序(最近优先) → id 升序
///
/// 用于 min_by, 故返回的 Ordering 以"更优"为 Less
fn compare_candidates(
    a_priority: i32,
    a_effective: NaiveDate,
    a_id: &str,
    b_priority: i32,
    b_effective: NaiveDate,
    b_id: &str,
) -> Ordering {
    b_priority
        .cmp(&a_priority)
        .then_with(|| b_effective.cmp(&a_effective))
        .then_with(|| a_id.cmp(b_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingredient::Ingredient;
    use crate::domain::specification::Site;
    use crate::domain::types::{MarketSegment, RecordStatus, Scope};
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_ingredient(preferred_vendor_id: Option<&str>) -> Ingredient {
        Ingredient {
            ingredient_id: "ING001".to_string(),
            scope: Scope::Global,
            name: "胡萝卜".to_string(),
            common_unit_id: "LB".to_string(),
            cost_per_common_unit: None,
            purchase_unit_cost: None,
            units_per_purchase_unit: None,
            yield_percent: None,
            preferred_vendor_id: preferred_vendor_id.map(|s| s.to_string()),
            status: RecordStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_site() -> Site {
        Site {
            site_id: "SITE001".to_string(),
            tenant_id: "T001".to_string(),
            name: "一号食堂".to_string(),
            segment: MarketSegment::Healthcare,
            status: RecordStatus::Active,
        }
    }

    fn site_pref(
        id: &str,
        priority: i32,
        effective: NaiveDate,
        end: Option<NaiveDate>,
        vendor: Option<&str>,
    ) -> SiteIngredientPreference {
        SiteIngredientPreference {
            id: id.to_string(),
            site_id: "SITE001".to_string(),
            ingredient_id: "ING001".to_string(),
            spec_id: format!("SPEC-{}", id),
            vendor_id: vendor.map(|s| s.to_string()),
            priority,
            effective_date: effective,
            end_date: end,
            status: RecordStatus::Active,
        }
    }

    fn segment_default(
        id: &str,
        priority: i32,
        effective: NaiveDate,
        end: Option<NaiveDate>,
    ) -> SegmentIngredientDefault {
        SegmentIngredientDefault {
            id: id.to_string(),
            segment: MarketSegment::Healthcare,
            ingredient_id: "ING001".to_string(),
            spec_id: format!("SPEC-{}", id),
            priority,
            effective_date: effective,
            end_date: end,
            status: RecordStatus::Active,
        }
    }

    fn global_spec(spec_id: &str, is_default: bool, scope: Scope) -> ProductSpecification {
        ProductSpecification {
            spec_id: spec_id.to_string(),
            ingredient_id: "ING001".to_string(),
            scope,
            name: format!("规格 {}", spec_id),
            grade: None,
            is_default,
            status: RecordStatus::Active,
        }
    }

    fn snapshot(
        prefs: Vec<SiteIngredientPreference>,
        defaults: Vec<SegmentIngredientDefault>,
        specs: Vec<ProductSpecification>,
    ) -> ResolutionSnapshot {
        ResolutionSnapshot {
            ingredient: test_ingredient(None),
            site: test_site(),
            site_preferences: prefs,
            segment_defaults: defaults,
            global_specifications: specs,
        }
    }

    #[test]
    fn test_site_tier_beats_segment_regardless_of_priority() {
        // 站点偏好 priority=10 vs 细分市场默认 priority=99:
        // 层级优先级压过数值优先级
        let snap = snapshot(
            vec![site_pref("P1", 10, date(2024, 1, 1), None, Some("V001"))],
            vec![segment_default("D1", 99, date(2024, 1, 1), None)],
            vec![global_spec("SPEC-G", true, Scope::Global)],
        );
        let outcome = SpecificationResolver::new().resolve(&snap, date(2024, 6, 1));
        assert_eq!(outcome.tier, ResolutionTier::Site);
        assert_eq!(outcome.spec_id.as_deref(), Some("SPEC-P1"));
        assert_eq!(outcome.vendor_id.as_deref(), Some("V001"));
    }

    #[test]
    fn test_priority_then_effective_date_then_id() {
        let snap = snapshot(
            vec![
                site_pref("P-C", 5, date(2024, 1, 1), None, None),
                site_pref("P-B", 9, date(2024, 2, 1), None, None),
                // 同 priority, 更近的 effective_date 优先
                site_pref("P-A", 9, date(2024, 3, 1), None, None),
            ],
            vec![],
            vec![],
        );
        let outcome = SpecificationResolver::new().resolve(&snap, date(2024, 6, 1));
        assert_eq!(outcome.spec_id.as_deref(), Some("SPEC-P-A"));

        // priority 与 effective_date 全平手 → 最小 id
        let snap = snapshot(
            vec![
                site_pref("P-B", 9, date(2024, 2, 1), None, None),
                site_pref("P-A", 9, date(2024, 2, 1), None, None),
            ],
            vec![],
            vec![],
        );
        let outcome = SpecificationResolver::new().resolve(&snap, date(2024, 6, 1));
        assert_eq!(outcome.spec_id.as_deref(), Some("SPEC-P-A"));
    }

    #[test]
    fn test_expired_row_excluded_even_without_other_candidates() {
        // end_date <= as_of 的行排除, 解析落到下一层级
        let snap = snapshot(
            vec![site_pref(
                "P1",
                99,
                date(2024, 1, 1),
                Some(date(2024, 6, 1)),
                None,
            )],
            vec![segment_default("D1", 1, date(2024, 1, 1), None)],
            vec![],
        );
        let outcome = SpecificationResolver::new().resolve(&snap, date(2024, 6, 1));
        assert_eq!(outcome.tier, ResolutionTier::Segment);
        assert_eq!(outcome.spec_id.as_deref(), Some("SPEC-D1"));
    }

    #[test]
    fn test_half_open_window_start_inclusive_end_exclusive() {
        assert!(window_contains(date(2024, 6, 1), None, date(2024, 6, 1)));
        assert!(!window_contains(
            date(2024, 6, 2),
            None,
            date(2024, 6, 1)
        ));
        assert!(window_contains(
            date(2024, 1, 1),
            Some(date(2024, 6, 2)),
            date(2024, 6, 1)
        ));
        assert!(!window_contains(
            date(2024, 1, 1),
            Some(date(2024, 6, 1)),
            date(2024, 6, 1)
        ));
    }

    #[test]
    fn test_segment_tier_falls_back_to_ingredient_vendor() {
        let mut snap = snapshot(
            vec![],
            vec![segment_default("D1", 1, date(2024, 1, 1), None)],
            vec![],
        );
        snap.ingredient = test_ingredient(Some("V-ING"));
        let outcome = SpecificationResolver::new().resolve(&snap, date(2024, 6, 1));
        assert_eq!(outcome.tier, ResolutionTier::Segment);
        assert_eq!(outcome.vendor_id.as_deref(), Some("V-ING"));
    }

    #[test]
    fn test_global_tier_ambiguous_default_picks_lowest_id() {
        let snap = snapshot(
            vec![],
            vec![],
            vec![
                global_spec("SPEC-B", true, Scope::Global),
                global_spec("SPEC-A", true, Scope::Global),
                global_spec("SPEC-X", false, Scope::Global),
            ],
        );
        let outcome = SpecificationResolver::new().resolve(&snap, date(2024, 6, 1));
        assert_eq!(outcome.tier, ResolutionTier::Global);
        assert_eq!(outcome.spec_id.as_deref(), Some("SPEC-A"));
        assert!(outcome
            .reasons
            .iter()
            .any(|r| r.contains("AMBIGUOUS_DEFAULT")));
    }

    #[test]
    fn test_global_tier_tenant_owned_default_beats_global() {
        let snap = snapshot(
            vec![],
            vec![],
            vec![
                global_spec("SPEC-A", true, Scope::Global),
                global_spec("SPEC-T", true, Scope::Tenant("T001".to_string())),
                global_spec("SPEC-Z", true, Scope::Tenant("T999".to_string())),
            ],
        );
        let outcome = SpecificationResolver::new().resolve(&snap, date(2024, 6, 1));
        // T999 的规格不可见; T001 私有规格压过平台级
        assert_eq!(outcome.spec_id.as_deref(), Some("SPEC-T"));
    }

    #[test]
    fn test_none_tier_is_normal_outcome() {
        let snap = snapshot(vec![], vec![], vec![]);
        let outcome = SpecificationResolver::new().resolve(&snap, date(2024, 6, 1));
        assert_eq!(outcome.tier, ResolutionTier::None);
        assert!(outcome.needs_manual());
        assert!(outcome.spec_id.is_none());
        assert!(!outcome.reasons.is_empty());
    }

    #[test]
    fn test_cancel_stops_resolution() {
        let snap = snapshot(
            vec![site_pref("P1", 1, date(2024, 1, 1), None, None)],
            vec![],
            vec![],
        );
        let cancelled = AtomicBool::new(true);
        let err = SpecificationResolver::new()
            .resolve_with_cancel(&snap, date(2024, 6, 1), &cancelled)
            .unwrap_err();
        assert!(matches!(err, EngineError::Cancelled));
    }
}
