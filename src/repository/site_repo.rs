// ==========================================
// 机构餐饮管理平台 - 站点仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::specification::Site;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row::{parse_segment, parse_status};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// SiteRepository - 站点仓储
// ==========================================

/// 站点仓储
/// 职责: 管理 site 表的数据访问 (解析链用于站点→租户/细分市场定位)
pub struct SiteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SiteRepository {
    /// 创建新的站点仓储实例
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

    /// 按编号查询单个站点
    pub fn find_by_id(&self, site_id: &str) -> RepositoryResult<Option<Site>> {
        let conn = self.get_conn()?;

        let raw = conn
            .query_row(
                r#"
                SELECT site_id, tenant_id, name, segment, status
                FROM site
                WHERE site_id = ?1
                "#,
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

    /// 写入站点 (参考数据装载/测试夹具用)
    pub fn insert(&self, site: &Site) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO site (site_id, tenant_id, name, segment, status)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                site.site_id,
                site.tenant_id,
                site.name,
                site.segment.to_string(),
                site.status.to_string(),
            ],
        )?;

        Ok(())
    }
}
