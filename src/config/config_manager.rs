// ==========================================
// 机构餐饮管理平台 - 配置管理器
// ==========================================
// 职责: 配置加载、查询
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// 货币精度默认值 (小数位)
pub const DEFAULT_CURRENCY_SCALE: u32 = 2;

/// 默认语言
pub const DEFAULT_LOCALE: &str = "zh-CN";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 货币精度 (报告边界舍入的小数位)
    ///
    /// # 配置键
    /// - costing/currency_scale (默认 2; 非法值回退默认并告警)
    pub fn get_currency_scale(&self) -> Result<u32, Box<dyn Error>> {
        match self.get_config_value("costing/currency_scale")? {
            Some(raw) => match raw.parse::<u32>() {
                Ok(scale) if scale <= 6 => Ok(scale),
                _ => {
                    warn!(value = %raw, "costing/currency_scale 配置非法, 回退默认值");
                    Ok(DEFAULT_CURRENCY_SCALE)
                }
            },
            None => Ok(DEFAULT_CURRENCY_SCALE),
        }
    }

    /// 界面语言
    ///
    /// # 配置键
    /// - app/locale (默认 zh-CN)
    pub fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value("app/locale")?
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string()))
    }

    /// 写入配置值 (scope_id='global'; 测试与初始化用)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value)
            VALUES ('global', ?1, ?2)
            ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;

        Ok(())
    }
}
