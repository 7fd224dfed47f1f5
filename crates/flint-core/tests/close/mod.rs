//! 关闭协调场景测试套件。
//!
//! 套件按“事实到达时交换推进到哪”组织：`scenarios` 覆盖分类策略的五个典型场景，
//! `lifecycle` 覆盖幂等性、终态拒绝、优雅排空与取消语义。

mod lifecycle;
mod scenarios;
mod support;
