// ==========================================
// 机构餐饮管理平台 - 采购规格仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 关键约束: 解析快照必须在单个读事务内装载,
// 避免管理端在三级查找间隙修改优先级/日期窗口造成撕裂读取
// ==========================================

use crate::domain::ingredient::Ingredient;
use crate::domain::specification::{
    ProductSpecification, ResolutionSnapshot, SegmentIngredientDefault, Site,
    SiteIngredientPreference,
};
use crate::domain::types::{MarketSegment, Scope};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row::{
    date_opt_to_text, date_to_text, parse_date, parse_date_opt, parse_decimal_opt, parse_segment,
    parse_status,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// SpecificationRepository - 采购规格仓储
// ==========================================

/// 采购规格仓储
/// 职责: 管理 product_specification / segment_ingredient_default /
///       site_ingredient_preference 三张表的数据访问
pub struct SpecificationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SpecificationRepository {
    /// 创建新的采购规格仓储实例
    pub fn new(db_path: String) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 解析快照装载
    // ==========================================

    /// 在单个读事务内装载一次规格解析所需的全部候选数据
    ///
    /// # 参数
    /// - ingredient_id: 食材编号
    /// - site_id: 站点编号
    ///
    /// # 返回
    /// - Ok(ResolutionSnapshot): 一致性快照
    /// - Err(NotFound): 食材或站点不存在
    ///
    /// # 说明
    /// 日期窗口过滤是业务规则, 留给引擎层; 此处只按状态取 ACTIVE 候选行
    pub fn load_resolution_snapshot(
        &self,
        ingredient_id: &str,
        site_id: &str,
    ) -> RepositoryResult<ResolutionSnapshot> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let ingredient =
            Self::query_ingredient(&tx, ingredient_id)?.ok_or_else(|| RepositoryError::NotFound {
                entity: "Ingredient".to_string(),
                id: ingredient_id.to_string(),
            })?;

        let site = Self::query_site(&tx, site_id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Site".to_string(),
            id: site_id.to_string(),
        })?;

        let site_preferences = Self::query_site_preferences(&tx, site_id, ingredient_id)?;
        let segment_defaults = Self::query_segment_defaults(&tx, site.segment, ingredient_id)?;
        let global_specifications = Self::query_active_specifications(&tx, ingredient_id)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(ResolutionSnapshot {
            ingredient,
            site,
            site_preferences,
            segment_defaults,
            global_specifications,
        })
    }

    fn query_ingredient(
        conn: &Connection,
        ingredient_id: &str,
    ) -> RepositoryResult<Option<Ingredient>> {
        let raw = conn
            .query_row(
                r#"
                SELECT ingredient_id, tenant_id, name, common_unit_id,
                       cost_per_common_unit, purchase_unit_cost, units_per_purchase_unit,
                       yield_percent, preferred_vendor_id, status, created_at, updated_at
                FROM ingredient
                WHERE ingredient_id = ?1
                "#,
                params![ingredient_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, Option<String>>(6)?,
                        row.get::<_, Option<String>>(7)?,
                        row.get::<_, Option<String>>(8)?,
                        row.get::<_, String>(9)?,
                        row.get::<_, DateTime<Utc>>(10)?,
                        row.get::<_, DateTime<Utc>>(11)?,
                    ))
                },
            )
            .optional()?;

        match raw {
            Some((
                ingredient_id,
                tenant_id,
                name,
                common_unit_id,
                cost_per_common_unit,
                purchase_unit_cost,
                units_per_purchase_unit,
                yield_percent,
                preferred_vendor_id,
                status,
                created_at,
                updated_at,
            )) => Ok(Some(Ingredient {
                ingredient_id,
                scope: Scope::from_tenant_column(tenant_id),
                name,
                common_unit_id,
                cost_per_common_unit: parse_decimal_opt(
                    "cost_per_common_unit",
                    cost_per_common_unit,
                )?,
                purchase_unit_cost: parse_decimal_opt("purchase_unit_cost", purchase_unit_cost)?,
                units_per_purchase_unit: parse_decimal_opt(
                    "units_per_purchase_unit",
                    units_per_purchase_unit,
                )?,
                yield_percent: parse_decimal_opt("yield_percent", yield_percent)?,
                preferred_vendor_id,
                status: parse_status("status", &status)?,
                created_at,
                updated_at,
            })),
            None => Ok(None),
        }
    }

    fn query_site(conn: &Connection, site_id: &str) -> RepositoryResult<Option<Site>> {
        let raw = conn
            .query_row(
                "SELECT site_id, tenant_id, name, segment, status FROM site WHERE site_id = ?1",
                params![site_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        match raw {
            Some((site_id, tenant_id, name, segment, status)) => Ok(Some(Site {
                site_id,
                tenant_id,
                name,
                segment: parse_segment("segment", &segment)?,
                status: parse_status("status", &status)?,
            })),
            None => Ok(None),
        }
    }

    fn query_site_preferences(
        conn: &Connection,
        site_id: &str,
        ingredient_id: &str,
    ) -> RepositoryResult<Vec<SiteIngredientPreference>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, site_id, ingredient_id, spec_id, vendor_id,
                   priority, effective_date, end_date, status
            FROM site_ingredient_preference
            WHERE site_id = ?1 AND ingredient_id = ?2 AND status = 'ACTIVE'
            ORDER BY id
            "#,
        )?;

        let rows = stmt
            .query_map(params![site_id, ingredient_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, i32>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, Option<String>>(7)?,
                    row.get::<_, String>(8)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut prefs = Vec::with_capacity(rows.len());
        for (id, site_id, ingredient_id, spec_id, vendor_id, priority, eff, end, status) in rows {
            prefs.push(SiteIngredientPreference {
                id,
                site_id,
                ingredient_id,
                spec_id,
                vendor_id,
                priority,
                effective_date: parse_date("effective_date", &eff)?,
                end_date: parse_date_opt("end_date", end)?,
                status: parse_status("status", &status)?,
            });
        }
        Ok(prefs)
    }

    fn query_segment_defaults(
        conn: &Connection,
        segment: MarketSegment,
        ingredient_id: &str,
    ) -> RepositoryResult<Vec<SegmentIngredientDefault>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, segment, ingredient_id, spec_id,
                   priority, effective_date, end_date, status
            FROM segment_ingredient_default
            WHERE segment = ?1 AND ingredient_id = ?2 AND status = 'ACTIVE'
            ORDER BY id
            "#,
        )?;

        let rows = stmt
            .query_map(params![segment.to_string(), ingredient_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i32>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut defaults = Vec::with_capacity(rows.len());
        for (id, segment, ingredient_id, spec_id, priority, eff, end, status) in rows {
            defaults.push(SegmentIngredientDefault {
                id,
                segment: parse_segment("segment", &segment)?,
                ingredient_id,
                spec_id,
                priority,
                effective_date: parse_date("effective_date", &eff)?,
                end_date: parse_date_opt("end_date", end)?,
                status: parse_status("status", &status)?,
            });
        }
        Ok(defaults)
    }

    fn query_active_specifications(
        conn: &Connection,
        ingredient_id: &str,
    ) -> RepositoryResult<Vec<ProductSpecification>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT spec_id, ingredient_id, tenant_id, name, grade, is_default, status
            FROM product_specification
            WHERE ingredient_id = ?1 AND status = 'ACTIVE'
            ORDER BY spec_id
            "#,
        )?;

        let rows = stmt
            .query_map(params![ingredient_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, bool>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut specs = Vec::with_capacity(rows.len());
        for (spec_id, ingredient_id, tenant_id, name, grade, is_default, status) in rows {
            specs.push(ProductSpecification {
                spec_id,
                ingredient_id,
                scope: Scope::from_tenant_column(tenant_id),
                name,
                grade,
                is_default,
                status: parse_status("status", &status)?,
            });
        }
        Ok(specs)
    }

    // ==========================================
    // 点查
    // ==========================================

    /// 按编号查询单条采购规格
    pub fn find_spec_by_id(
        &self,
        spec_id: &str,
    ) -> RepositoryResult<Option<ProductSpecification>> {
        let conn = self.get_conn()?;

        let raw = conn
            .query_row(
                r#"
                SELECT spec_id, ingredient_id, tenant_id, name, grade, is_default, status
                FROM product_specification
                WHERE spec_id = ?1
                "#,
                params![spec_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, bool>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()?;

        match raw {
            Some((spec_id, ingredient_id, tenant_id, name, grade, is_default, status)) => {
                Ok(Some(ProductSpecification {
                    spec_id,
                    ingredient_id,
                    scope: Scope::from_tenant_column(tenant_id),
                    name,
                    grade,
                    is_default,
                    status: parse_status("status", &status)?,
                }))
            }
            None => Ok(None),
        }
    }

    // ==========================================
    // 写入 (参考数据装载/测试夹具用)
    // ==========================================

    /// 写入采购规格
    pub fn insert_specification(&self, spec: &ProductSpecification) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO product_specification (
                spec_id, ingredient_id, tenant_id, name, grade, is_default, status
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                spec.spec_id,
                spec.ingredient_id,
                spec.scope.to_tenant_column(),
                spec.name,
                spec.grade,
                spec.is_default,
                spec.status.to_string(),
            ],
        )?;

        Ok(())
    }

    /// 写入细分市场默认绑定, 返回记录编号
    pub fn insert_segment_default(
        &self,
        default: &SegmentIngredientDefault,
    ) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let id = if default.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            default.id.clone()
        };

        conn.execute(
            r#"
            INSERT INTO segment_ingredient_default (
                id, segment, ingredient_id, spec_id,
                priority, effective_date, end_date, status
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                id,
                default.segment.to_string(),
                default.ingredient_id,
                default.spec_id,
                default.priority,
                date_to_text(default.effective_date),
                date_opt_to_text(default.end_date),
                default.status.to_string(),
            ],
        )?;

        Ok(id)
    }

    /// 写入站点偏好绑定, 返回记录编号
    pub fn insert_site_preference(
        &self,
        pref: &SiteIngredientPreference,
    ) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let id = if pref.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            pref.id.clone()
        };

        conn.execute(
            r#"
            INSERT INTO site_ingredient_preference (
                id, site_id, ingredient_id, spec_id, vendor_id,
                priority, effective_date, end_date, status
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                id,
                pref.site_id,
                pref.ingredient_id,
                pref.spec_id,
                pref.vendor_id,
                pref.priority,
                date_to_text(pref.effective_date),
                date_opt_to_text(pref.end_date),
                pref.status.to_string(),
            ],
        )?;

        Ok(id)
    }
}
