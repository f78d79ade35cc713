// ==========================================
// 机构餐饮管理平台 - 领域类型定义
// ==========================================
// 覆盖: 归属范围 / 记录状态 / 单位族 / 计量口径 / 细分市场 / 解析层级
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 归属范围 (Scope)
// ==========================================
// 红线: 引擎内部禁止裸用可空 tenant_id,
//       归属判定必须对该枚举做穷尽 match
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "tenant_id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    /// 平台级记录, 所有租户可见
    Global,
    /// 租户私有记录, 仅归属租户可见
    Tenant(String),
}

impl Scope {
    /// 从数据库的可空 tenant_id 列还原
    ///
    /// 约定: NULL = 平台级, 非 NULL = 租户私有
    pub fn from_tenant_column(tenant_id: Option<String>) -> Self {
        match tenant_id {
            Some(id) => Scope::Tenant(id),
            None => Scope::Global,
        }
    }

    /// 转回数据库的可空 tenant_id 列
    pub fn to_tenant_column(&self) -> Option<&str> {
        match self {
            Scope::Global => None,
            Scope::Tenant(id) => Some(id.as_str()),
        }
    }

    /// 是否为平台级记录
    pub fn is_global(&self) -> bool {
        matches!(self, Scope::Global)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "GLOBAL"),
            Scope::Tenant(id) => write!(f, "TENANT:{}", id),
        }
    }
}

// ==========================================
// 记录状态 (Record Status)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// 规则: 仅 ACTIVE 记录参与规格解析
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Active,   // 生效
    Inactive, // 停用
    Archived, // 归档
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Active => write!(f, "ACTIVE"),
            RecordStatus::Inactive => write!(f, "INACTIVE"),
            RecordStatus::Archived => write!(f, "ARCHIVED"),
        }
    }
}

impl RecordStatus {
    /// 从数据库字符串还原
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(RecordStatus::Active),
            "INACTIVE" => Some(RecordStatus::Inactive),
            "ARCHIVED" => Some(RecordStatus::Archived),
            _ => None,
        }
    }
}

// ==========================================
// 单位族 (Unit Family)
// ==========================================
// 红线: 单位换算仅允许同族进行;
//       跨族换算(体积→重量)需要食材密度数据, 本系统不建模
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitFamily {
    Weight, // 重量 (基准: 克)
    Volume, // 体积 (基准: 毫升)
    Count,  // 计数
    Each,   // 单件
}

impl fmt::Display for UnitFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitFamily::Weight => write!(f, "WEIGHT"),
            UnitFamily::Volume => write!(f, "VOLUME"),
            UnitFamily::Count => write!(f, "COUNT"),
            UnitFamily::Each => write!(f, "EACH"),
        }
    }
}

impl UnitFamily {
    /// 从数据库字符串还原
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "WEIGHT" => Some(UnitFamily::Weight),
            "VOLUME" => Some(UnitFamily::Volume),
            "COUNT" => Some(UnitFamily::Count),
            "EACH" => Some(UnitFamily::Each),
            _ => None,
        }
    }
}

// ==========================================
// 计量口径 (Measure Basis)
// ==========================================
// AP = 毛料(As Purchased), EP = 净料(Edible Portion)
// EP 数量需按出成率换算回采购量后再计价
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeasureBasis {
    AsPurchased,   // 毛料口径
    EdiblePortion, // 净料口径
}

impl fmt::Display for MeasureBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasureBasis::AsPurchased => write!(f, "AS_PURCHASED"),
            MeasureBasis::EdiblePortion => write!(f, "EDIBLE_PORTION"),
        }
    }
}

impl MeasureBasis {
    /// 从数据库字符串还原
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AS_PURCHASED" => Some(MeasureBasis::AsPurchased),
            "EDIBLE_PORTION" => Some(MeasureBasis::EdiblePortion),
            _ => None,
        }
    }
}

// ==========================================
// 细分市场 (Market Segment)
// ==========================================
// 用于选择细分市场层级的默认采购规格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketSegment {
    Healthcare,  // 医疗机构
    Education,   // 学校/教育
    Corporate,   // 企业团餐
    Hospitality, // 酒店/接待
    Corrections, // 司法机构
}

impl fmt::Display for MarketSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketSegment::Healthcare => write!(f, "HEALTHCARE"),
            MarketSegment::Education => write!(f, "EDUCATION"),
            MarketSegment::Corporate => write!(f, "CORPORATE"),
            MarketSegment::Hospitality => write!(f, "HOSPITALITY"),
            MarketSegment::Corrections => write!(f, "CORRECTIONS"),
        }
    }
}

impl MarketSegment {
    /// 从数据库字符串还原
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "HEALTHCARE" => Some(MarketSegment::Healthcare),
            "EDUCATION" => Some(MarketSegment::Education),
            "CORPORATE" => Some(MarketSegment::Corporate),
            "HOSPITALITY" => Some(MarketSegment::Hospitality),
            "CORRECTIONS" => Some(MarketSegment::Corrections),
            _ => None,
        }
    }
}

// ==========================================
// 解析层级 (Resolution Tier)
// ==========================================
// 优先级: SITE > SEGMENT > GLOBAL; NONE 为正常业务结果(非异常)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionTier {
    Site,    // 站点偏好
    Segment, // 细分市场默认
    Global,  // 全局默认规格
    None,    // 三级均无结果, 需人工指定
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionTier::Site => write!(f, "SITE"),
            ResolutionTier::Segment => write!(f, "SEGMENT"),
            ResolutionTier::Global => write!(f, "GLOBAL"),
            ResolutionTier::None => write!(f, "NONE"),
        }
    }
}

// ==========================================
// 核价状态 (Pricing Status)
// ==========================================
// 界面必须区分"完整核价/部分核价/未核价", 不允许单一成败信号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingStatus {
    FullyPriced,
    PartiallyPriced { priced: usize, total: usize },
    Unpriced,
}

impl fmt::Display for PricingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingStatus::FullyPriced => write!(f, "FULLY_PRICED"),
            PricingStatus::PartiallyPriced { priced, total } => {
                write!(f, "PARTIALLY_PRICED({}/{})", priced, total)
            }
            PricingStatus::Unpriced => write!(f, "UNPRICED"),
        }
    }
}
