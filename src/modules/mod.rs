//! Quill Blog 模块组织结构
//!
//! 核心配置和工具
pub mod config;
pub mod cli;
pub mod error;

// 数据库相关模块
pub mod database {
    pub mod schema;
    pub mod blogs;
    pub mod comments;
}

// 外部服务
pub mod services {
    pub mod imagekit;
    pub mod gemini;
}

// Web 相关模块
pub mod web {
    pub mod auth;
    pub mod admin;
    pub mod blog;
    pub mod routes;
    #[cfg(test)]
    pub mod test_support;
}
