// ==========================================
// 机构餐饮管理平台 - 行映射辅助函数
// ==========================================
// 约定:
// - 日期列按 TEXT "%Y-%m-%d" 存储
// - 货币/数量列按 TEXT 存储, 映射边界解析为 Decimal
// - 枚举列按 SCREAMING_SNAKE_CASE TEXT 存储
// ==========================================

use crate::domain::types::{MarketSegment, MeasureBasis, RecordStatus, UnitFamily};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// 解析日期列
pub(crate) fn parse_date(field: &str, value: &str) -> RepositoryResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: format!("日期格式错误 '{}': {}", value, e),
    })
}

/// 解析可空日期列
pub(crate) fn parse_date_opt(
    field: &str,
    value: Option<String>,
) -> RepositoryResult<Option<NaiveDate>> {
    match value {
        Some(s) => Ok(Some(parse_date(field, &s)?)),
        None => Ok(None),
    }
}

/// 解析 Decimal 列
pub(crate) fn parse_decimal(field: &str, value: &str) -> RepositoryResult<Decimal> {
    Decimal::from_str(value).map_err(|e| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: format!("数值格式错误 '{}': {}", value, e),
    })
}

/// 解析可空 Decimal 列
pub(crate) fn parse_decimal_opt(
    field: &str,
    value: Option<String>,
) -> RepositoryResult<Option<Decimal>> {
    match value {
        Some(s) => Ok(Some(parse_decimal(field, &s)?)),
        None => Ok(None),
    }
}

/// 解析记录状态列
pub(crate) fn parse_status(field: &str, value: &str) -> RepositoryResult<RecordStatus> {
    RecordStatus::parse(value).ok_or_else(|| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: format!("未知记录状态 '{}'", value),
    })
}

/// 解析单位族列
pub(crate) fn parse_family(field: &str, value: &str) -> RepositoryResult<UnitFamily> {
    UnitFamily::parse(value).ok_or_else(|| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: format!("未知单位族 '{}'", value),
    })
}

/// 解析细分市场列
pub(crate) fn parse_segment(field: &str, value: &str) -> RepositoryResult<MarketSegment> {
    MarketSegment::parse(value).ok_or_else(|| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: format!("未知细分市场 '{}'", value),
    })
}

/// 解析计量口径列
pub(crate) fn parse_basis(field: &str, value: &str) -> RepositoryResult<MeasureBasis> {
    MeasureBasis::parse(value).ok_or_else(|| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: format!("未知计量口径 '{}'", value),
    })
}

/// 日期转存储格式
pub(crate) fn date_to_text(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 可空日期转存储格式
pub(crate) fn date_opt_to_text(date: Option<NaiveDate>) -> Option<String> {
    date.map(date_to_text)
}
