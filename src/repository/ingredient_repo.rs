// ==========================================
// 机构餐饮管理平台 - 食材仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::ingredient::Ingredient;
use crate::domain::types::Scope;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row::{parse_decimal_opt, parse_status};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// IngredientRepository - 食材仓储
// ==========================================

/// 食材仓储
/// 职责: 管理 ingredient 表的数据访问
pub struct IngredientRepository {
    conn: Arc<Mutex<Connection>>,
}

/// 食材行的中间映射 (列值 → 领域实体分两步, Decimal/枚举解析需要显式报错)
struct IngredientRow {
    ingredient_id: String,
    tenant_id: Option<String>,
    name: String,
    common_unit_id: String,
    cost_per_common_unit: Option<String>,
    purchase_unit_cost: Option<String>,
    units_per_purchase_unit: Option<String>,
    yield_percent: Option<String>,
    preferred_vendor_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const INGREDIENT_COLUMNS: &str = r#"
    ingredient_id, tenant_id, name, common_unit_id,
    cost_per_common_unit, purchase_unit_cost, units_per_purchase_unit,
    yield_percent, preferred_vendor_id, status, created_at, updated_at
"#;

fn map_row(row: &Row<'_>) -> rusqlite::Result<IngredientRow> {
    Ok(IngredientRow {
        ingredient_id: row.get(0)?,
        tenant_id: row.get(1)?,
        name: row.get(2)?,
        common_unit_id: row.get(3)?,
        cost_per_common_unit: row.get(4)?,
        purchase_unit_cost: row.get(5)?,
        units_per_purchase_unit: row.get(6)?,
        yield_percent: row.get(7)?,
        preferred_vendor_id: row.get(8)?,
        status: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn into_ingredient(raw: IngredientRow) -> RepositoryResult<Ingredient> {
    Ok(Ingredient {
        ingredient_id: raw.ingredient_id,
        scope: Scope::from_tenant_column(raw.tenant_id),
        name: raw.name,
        common_unit_id: raw.common_unit_id,
        cost_per_common_unit: parse_decimal_opt("cost_per_common_unit", raw.cost_per_common_unit)?,
        purchase_unit_cost: parse_decimal_opt("purchase_unit_cost", raw.purchase_unit_cost)?,
        units_per_purchase_unit: parse_decimal_opt(
            "units_per_purchase_unit",
            raw.units_per_purchase_unit,
        )?,
        yield_percent: parse_decimal_opt("yield_percent", raw.yield_percent)?,
        preferred_vendor_id: raw.preferred_vendor_id,
        status: parse_status("status", &raw.status)?,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
    })
}

impl IngredientRepository {
    /// 创建新的食材仓储实例
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

    /// 按编号查询单个食材
    pub fn find_by_id(&self, ingredient_id: &str) -> RepositoryResult<Option<Ingredient>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM ingredient WHERE ingredient_id = ?1",
            INGREDIENT_COLUMNS
        );
        let raw = conn
            .query_row(&sql, params![ingredient_id], map_row)
            .optional()?;

        match raw {
            Some(r) => Ok(Some(into_ingredient(r)?)),
            None => Ok(None),
        }
    }

    /// 按编号集合批量查询食材
    ///
    /// # 返回
    /// - Ok(Vec<Ingredient>): 命中的食材 (缺失的编号静默跳过, 由调用方比对)
    pub fn list_by_ids(&self, ingredient_ids: &[String]) -> RepositoryResult<Vec<Ingredient>> {
        if ingredient_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_conn()?;

        let placeholders = ingredient_ids
            .iter()
            .enumerate()
            .map(|(i, _)| format!("?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {} FROM ingredient WHERE ingredient_id IN ({}) ORDER BY ingredient_id",
            INGREDIENT_COLUMNS, placeholders
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(ingredient_ids.iter()), map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut ingredients = Vec::with_capacity(rows.len());
        for raw in rows {
            ingredients.push(into_ingredient(raw)?);
        }
        Ok(ingredients)
    }

    /// 写入食材 (参考数据装载/测试夹具用)
    pub fn insert(&self, ingredient: &Ingredient) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO ingredient (
                ingredient_id, tenant_id, name, common_unit_id,
                cost_per_common_unit, purchase_unit_cost, units_per_purchase_unit,
                yield_percent, preferred_vendor_id, status, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                ingredient.ingredient_id,
                ingredient.scope.to_tenant_column(),
                ingredient.name,
                ingredient.common_unit_id,
                ingredient.cost_per_common_unit.map(|d| d.to_string()),
                ingredient.purchase_unit_cost.map(|d| d.to_string()),
                ingredient.units_per_purchase_unit.map(|d| d.to_string()),
                ingredient.yield_percent.map(|d| d.to_string()),
                ingredient.preferred_vendor_id,
                ingredient.status.to_string(),
                ingredient.created_at,
                ingredient.updated_at,
            ],
        )?;

        Ok(())
    }
}
