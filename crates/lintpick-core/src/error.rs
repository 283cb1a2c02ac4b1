//! 错误类型（对外暴露）
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 核心库统一错误
#[derive(Debug, Error)]
pub enum Error {
    /// 项目根目录不可读或遍历初始化失败（本次扫描失败）
    #[error("cannot scan project root {path}: {source}")]
    ScanRoot {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// 自定义插件目录存在但不可读
    #[error("cannot list custom plugins in {path}: {source}")]
    CustomPlugins {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 参数文件写入失败（对本次运行是致命的）
    #[error("cannot write options file {path}: {source}")]
    WriteOptions {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid project config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
