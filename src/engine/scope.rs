// ==========================================
// 机构餐饮管理平台 - 租户归属判定引擎
// ==========================================
// 红线: 无状态、无副作用、无 I/O 操作
// 规则: 平台级记录全租户可见; 租户记录仅归属租户可见;
//       同一逻辑键下租户记录优先于平台级记录
// ==========================================

use crate::domain::ingredient::Ingredient;
use crate::domain::recipe::Recipe;
use crate::domain::specification::ProductSpecification;
use crate::domain::types::Scope;

// ==========================================
// Scoped - 带归属范围的记录
// ==========================================

/// 带归属范围的参考记录
pub trait Scoped {
    fn scope(&self) -> &Scope;
}

impl Scoped for Ingredient {
    fn scope(&self) -> &Scope {
        &self.scope
    }
}

impl Scoped for ProductSpecification {
    fn scope(&self) -> &Scope {
        &self.scope
    }
}

impl Scoped for Recipe {
    fn scope(&self) -> &Scope {
        &self.scope
    }
}

// ==========================================
// TenantScopeResolver - 租户归属判定
// ==========================================

pub struct TenantScopeResolver {
    // 无状态引擎,不需要注入依赖
}

impl TenantScopeResolver {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 判定记录对指定租户是否可见
    ///
    /// # 规则
    /// - Global → 对所有租户可见
    /// - Tenant(owner) → 仅 owner == tenant_id 时可见
    pub fn is_visible(&self, scope: &Scope, tenant_id: &str) -> bool {
        match scope {
            Scope::Global => true,
            Scope::Tenant(owner) => owner == tenant_id,
        }
    }

    /// 过滤出对指定租户可见的记录
    pub fn visible_to<'a, T: Scoped>(&self, records: &'a [T], tenant_id: &str) -> Vec<&'a T> {
        records
            .iter()
            .filter(|r| self.is_visible(r.scope(), tenant_id))
            .collect()
    }

    /// 同一逻辑键下的候选集合内, 租户私有记录优先于平台级记录
    ///
    /// # 返回
    /// - 存在租户私有候选 → 仅保留租户私有候选
    /// - 否则 → 保留平台级候选
    ///
    /// # 说明
    /// 不可见记录先被 visible_to 排除; 此函数只做层内优先级收窄
    pub fn prefer_tenant_owned<'a, T: Scoped>(&self, candidates: Vec<&'a T>) -> Vec<&'a T> {
        let has_tenant_owned = candidates.iter().any(|r| !r.scope().is_global());
        if has_tenant_owned {
            candidates
                .into_iter()
                .filter(|r| !r.scope().is_global())
                .collect()
        } else {
            candidates
        }
    }
}

impl Default for TenantScopeResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RecordStatus;

    fn spec(spec_id: &str, scope: Scope) -> ProductSpecification {
        ProductSpecification {
            spec_id: spec_id.to_string(),
            ingredient_id: "ING001".to_string(),
            scope,
            name: format!("规格 {}", spec_id),
            grade: None,
            is_default: true,
            status: RecordStatus::Active,
        }
    }

    #[test]
    fn test_global_visible_to_all() {
        let resolver = TenantScopeResolver::new();
        assert!(resolver.is_visible(&Scope::Global, "T001"));
        assert!(resolver.is_visible(&Scope::Global, "T002"));
    }

    #[test]
    fn test_tenant_record_only_visible_to_owner() {
        let resolver = TenantScopeResolver::new();
        let scope = Scope::Tenant("T001".to_string());
        assert!(resolver.is_visible(&scope, "T001"));
        assert!(!resolver.is_visible(&scope, "T002"));
    }

    #[test]
    fn test_visible_to_filters_foreign_tenant_records() {
        let resolver = TenantScopeResolver::new();
        let specs = vec![
            spec("SPEC-A", Scope::Global),
            spec("SPEC-B", Scope::Tenant("T001".to_string())),
            spec("SPEC-C", Scope::Tenant("T002".to_string())),
        ];
        let visible = resolver.visible_to(&specs, "T001");
        let ids: Vec<&str> = visible.iter().map(|s| s.spec_id.as_str()).collect();
        assert_eq!(ids, vec!["SPEC-A", "SPEC-B"]);
    }

    #[test]
    fn test_tenant_owned_beats_global() {
        let resolver = TenantScopeResolver::new();
        let specs = vec![
            spec("SPEC-A", Scope::Global),
            spec("SPEC-B", Scope::Tenant("T001".to_string())),
        ];
        let visible = resolver.visible_to(&specs, "T001");
        let preferred = resolver.prefer_tenant_owned(visible);
        assert_eq!(preferred.len(), 1);
        assert_eq!(preferred[0].spec_id, "SPEC-B");
    }

    #[test]
    fn test_global_kept_when_no_tenant_owned() {
        let resolver = TenantScopeResolver::new();
        let specs = vec![spec("SPEC-A", Scope::Global)];
        let visible = resolver.visible_to(&specs, "T001");
        let preferred = resolver.prefer_tenant_owned(visible);
        assert_eq!(preferred.len(), 1);
        assert_eq!(preferred[0].spec_id, "SPEC-A");
    }

    #[test]
    fn test_scoped_covers_ingredient_and_recipe() {
        use chrono::Utc;
        use rust_decimal::Decimal;

        let resolver = TenantScopeResolver::new();

        let ingredient = Ingredient {
            ingredient_id: "ING001".to_string(),
            scope: Scope::Tenant("T001".to_string()),
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
        };
        assert!(resolver.is_visible(ingredient.scope(), "T001"));
        assert!(!resolver.is_visible(ingredient.scope(), "T002"));

        let recipe = Recipe {
            recipe_id: "R001".to_string(),
            scope: Scope::Global,
            name: "基础高汤".to_string(),
            yield_quantity: Decimal::from(25),
            yield_unit_id: "EA".to_string(),
            status: RecordStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(resolver.is_visible(recipe.scope(), "T002"));
    }
}
