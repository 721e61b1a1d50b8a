//! # 常用接口模块
//!
//! 目前只包含单元测试用到的断言宏
