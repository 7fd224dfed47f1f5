//! 关闭协调的静态配置。配置的加载与热更新属于宿主职责，本模块只定义结构。

use serde::{Deserialize, Serialize};

use crate::close::IdleRacePolicy;

/// `CloseConfig` 收口关闭协调器的全部策略开关。
///
/// # 契约说明（What）
/// - `idle_race_policy`：空闲竞速场景的裁决口径，见 [`IdleRacePolicy`]；
/// - `graceful_drain`：本端主动关闭时是否等待在途写完成后再请求出站半关闭。
///   关闭该开关后，`user_close` 立即请求整体关闭，在途交换按常规分类表定性。
///
/// # 设计取舍（Trade-offs）
/// - 字段全部 `Copy`，协调器按值持有一份，运行期不可变；需要不同策略的连接
///   在建连时注入各自的配置。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloseConfig {
    /// 空闲竞速裁决口径。
    pub idle_race_policy: IdleRacePolicy,
    /// 本端主动关闭时优雅排空在途写。
    pub graceful_drain: bool,
}

impl Default for CloseConfig {
    fn default() -> Self {
        Self {
            idle_race_policy: IdleRacePolicy::ObserveRaw,
            graceful_drain: true,
        }
    }
}
