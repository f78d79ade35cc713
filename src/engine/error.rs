// ==========================================
// 机构餐饮管理平台 - 引擎层错误类型
// ==========================================
// 注意: 行级计价问题(单位不兼容/出成率越界等)不是引擎错误,
//       属于局部恢复的 LineCostIssue; 此处只定义硬性失败
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 缩放目标产量必须 > 0
    #[error("无效的目标产量: {target_yield} (必须 > 0)")]
    InvalidTargetYield { target_yield: String },

    /// 配方自身产量非正, 无法计算缩放因子
    #[error("配方产量无效: recipe_id={recipe_id}, yield_quantity={yield_quantity}")]
    InvalidRecipeYield {
        recipe_id: String,
        yield_quantity: String,
    },

    /// 调用方已取消, 解析链停止后续层级查找
    #[error("操作已取消")]
    Cancelled,
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
