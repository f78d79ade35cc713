// ==========================================
// 机构餐饮管理平台 - 单位换算引擎
// ==========================================
// 红线: 无状态、无副作用、无 I/O 操作
// 红线: 仅同族换算; 跨族(体积→重量)需密度数据, 本系统不支持
// ==========================================

use crate::domain::types::UnitFamily;
use crate::domain::unit::UnitOfMeasure;
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

// ==========================================
// ConversionError - 换算错误
// ==========================================

/// 单位换算错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("未知计量单位: {unit_id}")]
    UnknownUnit { unit_id: String },

    #[error("单位族不兼容: {from_unit}({from_family}) → {to_unit}({to_family})")]
    IncompatibleFamilies {
        from_unit: String,
        from_family: UnitFamily,
        to_unit: String,
        to_family: UnitFamily,
    },

    #[error("非法换算系数: unit_id={unit_id}, factor={factor} (必须 > 0)")]
    InvalidConversionFactor { unit_id: String, factor: String },
}

// ==========================================
// UnitConverter - 单位换算表
// ==========================================

/// 单位换算表
///
/// 由静态参考数据构建; 换算规则:
/// quantity × from.to_base_factor / to.to_base_factor (仅限同族)
pub struct UnitConverter {
    units: HashMap<String, UnitOfMeasure>,
}

impl UnitConverter {
    /// 从单位列表构建换算表
    pub fn new(units: Vec<UnitOfMeasure>) -> Self {
        let units = units
            .into_iter()
            .map(|u| (u.unit_id.clone(), u))
            .collect();
        Self { units }
    }

    /// 查询单位定义
    pub fn find(&self, unit_id: &str) -> Option<&UnitOfMeasure> {
        self.units.get(unit_id)
    }

    /// 单位数量
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// 是否为空表
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// 同族单位换算
    ///
    /// # 规则
    /// 1. from == to → 原样返回 (短路)
    /// 2. 两单位必须同族, 否则 IncompatibleFamilies
    /// 3. 换算系数必须 > 0, 否则 InvalidConversionFactor
    ///
    /// # 参数
    /// - quantity: 待换算数量
    /// - from_unit_id: 源单位编号
    /// - to_unit_id: 目标单位编号
    pub fn convert(
        &self,
        quantity: Decimal,
        from_unit_id: &str,
        to_unit_id: &str,
    ) -> Result<Decimal, ConversionError> {
        if from_unit_id == to_unit_id {
            return Ok(quantity);
        }

        let from = self
            .units
            .get(from_unit_id)
            .ok_or_else(|| ConversionError::UnknownUnit {
                unit_id: from_unit_id.to_string(),
            })?;
        let to = self
            .units
            .get(to_unit_id)
            .ok_or_else(|| ConversionError::UnknownUnit {
                unit_id: to_unit_id.to_string(),
            })?;

        if from.family != to.family {
            return Err(ConversionError::IncompatibleFamilies {
                from_unit: from.unit_id.clone(),
                from_family: from.family,
                to_unit: to.unit_id.clone(),
                to_family: to.family,
            });
        }

        for unit in [from, to] {
            if unit.to_base_factor <= Decimal::ZERO {
                return Err(ConversionError::InvalidConversionFactor {
                    unit_id: unit.unit_id.clone(),
                    factor: unit.to_base_factor.to_string(),
                });
            }
        }

        Ok(quantity * from.to_base_factor / to.to_base_factor)
    }
}
