//! 数据模型模块

pub mod auth;
pub mod exhibition;
pub mod user;
