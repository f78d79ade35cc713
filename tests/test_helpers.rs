// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use foodservice_costing::domain::types::{
    MarketSegment, MeasureBasis, RecordStatus, Scope, UnitFamily,
};
use foodservice_costing::domain::{
    Ingredient, ProductSpecification, Recipe, RecipeIngredient, SegmentIngredientDefault, Site,
    SiteIngredientPreference, UnitOfMeasure,
};
use foodservice_costing::repository::{
    IngredientRepository, RecipeRepository, SiteRepository, SpecificationRepository,
    UnitRepository,
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = Connection::open(&db_path)?;

    // 初始化 schema
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库共享连接
pub fn open_test_connection(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    let conn = foodservice_costing::db::open_sqlite_connection(db_path)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 初始化数据库 schema
///
/// 建库/迁移由外围平台负责; 测试内复刻本核心只读的表结构
fn init_schema(conn: &Connection) -> Result<(), Box<dyn Error>> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        INSERT OR IGNORE INTO schema_version (version) VALUES (1);

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            UNIQUE(scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS unit_of_measure (
            unit_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            family TEXT NOT NULL,
            to_base_factor TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS ingredient (
            ingredient_id TEXT PRIMARY KEY,
            tenant_id TEXT,
            name TEXT NOT NULL,
            common_unit_id TEXT NOT NULL,
            cost_per_common_unit TEXT,
            purchase_unit_cost TEXT,
            units_per_purchase_unit TEXT,
            yield_percent TEXT,
            preferred_vendor_id TEXT,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS site (
            site_id TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            name TEXT NOT NULL,
            segment TEXT NOT NULL,
            status TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS product_specification (
            spec_id TEXT PRIMARY KEY,
            ingredient_id TEXT NOT NULL,
            tenant_id TEXT,
            name TEXT NOT NULL,
            grade TEXT,
            is_default INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS segment_ingredient_default (
            id TEXT PRIMARY KEY,
            segment TEXT NOT NULL,
            ingredient_id TEXT NOT NULL,
            spec_id TEXT NOT NULL,
            priority INTEGER NOT NULL,
            effective_date TEXT NOT NULL,
            end_date TEXT,
            status TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS site_ingredient_preference (
            id TEXT PRIMARY KEY,
            site_id TEXT NOT NULL,
            ingredient_id TEXT NOT NULL,
            spec_id TEXT NOT NULL,
            vendor_id TEXT,
            priority INTEGER NOT NULL,
            effective_date TEXT NOT NULL,
            end_date TEXT,
            status TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS recipe (
            recipe_id TEXT PRIMARY KEY,
            tenant_id TEXT,
            name TEXT NOT NULL,
            yield_quantity TEXT NOT NULL,
            yield_unit_id TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS recipe_ingredient (
            recipe_ingredient_id TEXT PRIMARY KEY,
            recipe_id TEXT NOT NULL,
            seq_no INTEGER NOT NULL,
            ingredient_id TEXT NOT NULL,
            quantity TEXT NOT NULL,
            unit_id TEXT NOT NULL,
            measure_basis TEXT NOT NULL
        );
        "#,
    )?;

    Ok(())
}

// ==========================================
// 数值/日期便捷函数
// ==========================================

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ==========================================
// 标准参考数据
// ==========================================

/// 写入标准计量单位表 (重量/体积/单件)
pub fn seed_standard_units(repo: &UnitRepository) {
    let units = vec![
        UnitOfMeasure::new("G", "克", UnitFamily::Weight, dec("1")),
        UnitOfMeasure::new("KG", "千克", UnitFamily::Weight, dec("1000")),
        UnitOfMeasure::new("LB", "磅", UnitFamily::Weight, dec("453.59237")),
        UnitOfMeasure::new("OZ", "盎司", UnitFamily::Weight, dec("28.349523125")),
        UnitOfMeasure::new("ML", "毫升", UnitFamily::Volume, dec("1")),
        UnitOfMeasure::new("L", "升", UnitFamily::Volume, dec("1000")),
        UnitOfMeasure::new("CUP", "杯", UnitFamily::Volume, dec("236.588")),
        UnitOfMeasure::new("EA", "份", UnitFamily::Each, dec("1")),
    ];
    for unit in units {
        repo.insert(&unit).expect("写入计量单位失败");
    }
}

// ==========================================
// 测试数据构造函数
// ==========================================

/// 创建测试用的食材
pub fn make_ingredient(
    ingredient_id: &str,
    common_unit_id: &str,
    cost_per_common_unit: Option<&str>,
    yield_percent: Option<&str>,
) -> Ingredient {
    Ingredient {
        ingredient_id: ingredient_id.to_string(),
        scope: Scope::Global,
        name: format!("食材-{}", ingredient_id),
        common_unit_id: common_unit_id.to_string(),
        cost_per_common_unit: cost_per_common_unit.map(dec),
        purchase_unit_cost: None,
        units_per_purchase_unit: None,
        yield_percent: yield_percent.map(dec),
        preferred_vendor_id: None,
        status: RecordStatus::Active,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// 创建测试用的站点
pub fn make_site(site_id: &str, tenant_id: &str, segment: MarketSegment) -> Site {
    Site {
        site_id: site_id.to_string(),
        tenant_id: tenant_id.to_string(),
        name: format!("站点-{}", site_id),
        segment,
        status: RecordStatus::Active,
    }
}

/// 创建测试用的采购规格
pub fn make_spec(
    spec_id: &str,
    ingredient_id: &str,
    scope: Scope,
    is_default: bool,
) -> ProductSpecification {
    ProductSpecification {
        spec_id: spec_id.to_string(),
        ingredient_id: ingredient_id.to_string(),
        scope,
        name: format!("规格-{}", spec_id),
        grade: None,
        is_default,
        status: RecordStatus::Active,
    }
}

/// 创建测试用的站点偏好
pub fn make_site_pref(
    id: &str,
    site_id: &str,
    ingredient_id: &str,
    spec_id: &str,
    vendor_id: Option<&str>,
    priority: i32,
    effective_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> SiteIngredientPreference {
    SiteIngredientPreference {
        id: id.to_string(),
        site_id: site_id.to_string(),
        ingredient_id: ingredient_id.to_string(),
        spec_id: spec_id.to_string(),
        vendor_id: vendor_id.map(|s| s.to_string()),
        priority,
        effective_date,
        end_date,
        status: RecordStatus::Active,
    }
}

/// 创建测试用的细分市场默认绑定
pub fn make_segment_default(
    id: &str,
    segment: MarketSegment,
    ingredient_id: &str,
    spec_id: &str,
    priority: i32,
    effective_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> SegmentIngredientDefault {
    SegmentIngredientDefault {
        id: id.to_string(),
        segment,
        ingredient_id: ingredient_id.to_string(),
        spec_id: spec_id.to_string(),
        priority,
        effective_date,
        end_date,
        status: RecordStatus::Active,
    }
}

/// 创建测试用的配方
pub fn make_recipe(recipe_id: &str, yield_quantity: &str, yield_unit_id: &str) -> Recipe {
    Recipe {
        recipe_id: recipe_id.to_string(),
        scope: Scope::Global,
        name: format!("配方-{}", recipe_id),
        yield_quantity: dec(yield_quantity),
        yield_unit_id: yield_unit_id.to_string(),
        status: RecordStatus::Active,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// 创建测试用的配方行
pub fn make_line(
    recipe_ingredient_id: &str,
    recipe_id: &str,
    seq_no: i32,
    ingredient_id: &str,
    quantity: &str,
    unit_id: &str,
    measure_basis: MeasureBasis,
) -> RecipeIngredient {
    RecipeIngredient {
        recipe_ingredient_id: recipe_ingredient_id.to_string(),
        recipe_id: recipe_id.to_string(),
        seq_no,
        ingredient_id: ingredient_id.to_string(),
        quantity: dec(quantity),
        unit_id: unit_id.to_string(),
        measure_basis,
    }
}

// ==========================================
// 仓储便捷构造
// ==========================================

/// 在同一个共享连接上构造全套仓储
pub struct TestRepos {
    pub units: UnitRepository,
    pub ingredients: IngredientRepository,
    pub sites: SiteRepository,
    pub specs: SpecificationRepository,
    pub recipes: RecipeRepository,
}

pub fn build_repos(conn: Arc<Mutex<Connection>>) -> TestRepos {
    TestRepos {
        units: UnitRepository::from_connection(conn.clone()),
        ingredients: IngredientRepository::from_connection(conn.clone()),
        sites: SiteRepository::from_connection(conn.clone()),
        specs: SpecificationRepository::from_connection(conn.clone()),
        recipes: RecipeRepository::from_connection(conn),
    }
}
