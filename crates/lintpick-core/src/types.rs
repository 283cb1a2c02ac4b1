//! 公共类型（对外暴露）
use serde::{Deserialize, Serialize};

/// 语言类型（只有 Programming 参与计数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageKind {
    Programming,
    Markup,
    Data,
    Prose,
    Unknown,
}

/// 路径启发式判定结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PathTraits {
    pub vendor: bool,
    pub dotfile: bool,
    pub documentation: bool,
    pub configuration: bool,
    pub generated: bool,
}

impl PathTraits {
    /// 首个命中的忽略原因（按 vendor → dotfile → documentation → configuration → generated 顺序）
    pub fn ignore_reason(&self) -> Option<IgnoreReason> {
        if self.vendor {
            Some(IgnoreReason::Vendor)
        } else if self.dotfile {
            Some(IgnoreReason::DotFile)
        } else if self.documentation {
            Some(IgnoreReason::Documentation)
        } else if self.configuration {
            Some(IgnoreReason::Configuration)
        } else if self.generated {
            Some(IgnoreReason::Generated)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    ToolingDir,
    Vendor,
    DotFile,
    Documentation,
    Configuration,
    Generated,
    Unreadable,
}

/// 单个路径的分类结论（每次扫描重新计算，不缓存）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileVerdict {
    Ignored(IgnoreReason),
    Language(String),
    NotProgramming,
}

/// .NET 项目属性；Project 与 Solution 至多一个生效（Project 优先）
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DotNetOptions {
    pub project: Option<String>,
    pub solution: Option<String>,
    pub configuration: Option<String>,
    pub platform: Option<String>,
    pub frameworks: Option<String>,
}
