// ==========================================
// 机构餐饮管理平台 - 计量单位仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::unit::UnitOfMeasure;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row::{parse_decimal, parse_family};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// UnitRepository - 计量单位仓储
// ==========================================

/// 计量单位仓储
/// 职责: 管理 unit_of_measure 表的数据访问
pub struct UnitRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UnitRepository {
    /// 创建新的计量单位仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
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

    /// 查询全部计量单位
    ///
    /// # 返回
    /// - Ok(Vec<UnitOfMeasure>): 单位列表 (按 unit_id 排序)
    pub fn list_all(&self) -> RepositoryResult<Vec<UnitOfMeasure>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT unit_id, name, family, to_base_factor
            FROM unit_of_measure
            ORDER BY unit_id
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut units = Vec::with_capacity(rows.len());
        for (unit_id, name, family, factor) in rows {
            units.push(UnitOfMeasure {
                unit_id,
                name,
                family: parse_family("family", &family)?,
                to_base_factor: parse_decimal("to_base_factor", &factor)?,
            });
        }

        Ok(units)
    }

    /// 按编号查询单个计量单位
    pub fn find_by_id(&self, unit_id: &str) -> RepositoryResult<Option<UnitOfMeasure>> {
        let conn = self.get_conn()?;

        let raw = conn
            .query_row(
                r#"
                SELECT unit_id, name, family, to_base_factor
                FROM unit_of_measure
                WHERE unit_id = ?1
                "#,
                params![unit_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match raw {
            Some((unit_id, name, family, factor)) => Ok(Some(UnitOfMeasure {
                unit_id,
                name,
                family: parse_family("family", &family)?,
                to_base_factor: parse_decimal("to_base_factor", &factor)?,
            })),
            None => Ok(None),
        }
    }

    /// 写入计量单位 (参考数据装载/测试夹具用)
    pub fn insert(&self, unit: &UnitOfMeasure) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO unit_of_measure (unit_id, name, family, to_base_factor)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                unit.unit_id,
                unit.name,
                unit.family.to_string(),
                unit.to_base_factor.to_string(),
            ],
        )?;

        Ok(())
    }
}
