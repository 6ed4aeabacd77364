//! gatehouse-identity - 身份服务
//!
//! 注册、邮箱验证、登录、资料管理、注销与请求限流。

pub mod api;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod state;
