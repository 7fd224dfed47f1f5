//! 时间契约测试套件：虚拟时钟驱动的静默窗口断言。

mod quiescence;
