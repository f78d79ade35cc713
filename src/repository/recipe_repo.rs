// ==========================================
// 机构餐饮管理平台 - 配方仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 配方对本引擎只读; insert 仅服务于参考数据装载与测试夹具
// ==========================================

use crate::domain::recipe::{Recipe, RecipeIngredient};
use crate::domain::types::Scope;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row::{parse_basis, parse_decimal, parse_status};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// RecipeRepository - 配方仓储
// ==========================================

/// 配方仓储
/// 职责: 管理 recipe / recipe_ingredient 表的数据访问
pub struct RecipeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RecipeRepository {
    /// 创建新的配方仓储实例
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

    /// 按编号查询单个配方
    pub fn find_by_id(&self, recipe_id: &str) -> RepositoryResult<Option<Recipe>> {
        let conn = self.get_conn()?;

        let raw = conn
            .query_row(
                r#"
                SELECT recipe_id, tenant_id, name, yield_quantity, yield_unit_id,
                       status, created_at, updated_at
                FROM recipe
                WHERE recipe_id = ?1
                "#,
                params![recipe_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, DateTime<Utc>>(6)?,
                        row.get::<_, DateTime<Utc>>(7)?,
                    ))
                },
            )
            .optional()?;

        match raw {
            Some((
                recipe_id,
                tenant_id,
                name,
                yield_quantity,
                yield_unit_id,
                status,
                created_at,
                updated_at,
            )) => Ok(Some(Recipe {
                recipe_id,
                scope: Scope::from_tenant_column(tenant_id),
                name,
                yield_quantity: parse_decimal("yield_quantity", &yield_quantity)?,
                yield_unit_id,
                status: parse_status("status", &status)?,
                created_at,
                updated_at,
            })),
            None => Ok(None),
        }
    }

    /// 查询配方的食材行 (按行序号排序)
    pub fn list_ingredients(&self, recipe_id: &str) -> RepositoryResult<Vec<RecipeIngredient>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT recipe_ingredient_id, recipe_id, seq_no, ingredient_id,
                   quantity, unit_id, measure_basis
            FROM recipe_ingredient
            WHERE recipe_id = ?1
            ORDER BY seq_no
            "#,
        )?;

        let rows = stmt
            .query_map(params![recipe_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i32>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut lines = Vec::with_capacity(rows.len());
        for (recipe_ingredient_id, recipe_id, seq_no, ingredient_id, quantity, unit_id, basis) in
            rows
        {
            lines.push(RecipeIngredient {
                recipe_ingredient_id,
                recipe_id,
                seq_no,
                ingredient_id,
                quantity: parse_decimal("quantity", &quantity)?,
                unit_id,
                measure_basis: parse_basis("measure_basis", &basis)?,
            });
        }
        Ok(lines)
    }

    /// 写入配方 (参考数据装载/测试夹具用)
    pub fn insert_recipe(&self, recipe: &Recipe) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO recipe (
                recipe_id, tenant_id, name, yield_quantity, yield_unit_id,
                status, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                recipe.recipe_id,
                recipe.scope.to_tenant_column(),
                recipe.name,
                recipe.yield_quantity.to_string(),
                recipe.yield_unit_id,
                recipe.status.to_string(),
                recipe.created_at,
                recipe.updated_at,
            ],
        )?;

        Ok(())
    }

    /// 写入配方食材行, 返回行编号
    pub fn insert_ingredient_line(
        &self,
        line: &RecipeIngredient,
    ) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let line_id = if line.recipe_ingredient_id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            line.recipe_ingredient_id.clone()
        };

        conn.execute(
            r#"
            INSERT INTO recipe_ingredient (
                recipe_ingredient_id, recipe_id, seq_no, ingredient_id,
                quantity, unit_id, measure_basis
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                line_id,
                line.recipe_id,
                line.seq_no,
                line.ingredient_id,
                line.quantity.to_string(),
                line.unit_id,
                line.measure_basis.to_string(),
            ],
        )?;

        Ok(line_id)
    }
}
