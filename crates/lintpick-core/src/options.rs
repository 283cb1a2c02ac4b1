//! 扫描选项、统计信息与运行目录布局（模块）
use std::path::{Path, PathBuf};

/// 单文件内容采样上限（字节）：只读前缀，避免超大文件拖慢扫描
pub const DEFAULT_CONTENT_LIMIT: u64 = 64 * 1024; // 64 KiB

/// 语言扫描选项
#[derive(Debug, Clone)]
pub struct DetectOptions {
    /// 内容采样上限（字节）；0 表示不限制
    pub content_limit: u64,
    /// 工具元数据目录名：路径任一段命中即跳过整棵子树
    pub ignored_dirs: Vec<String>,
    /// 是否读取根目录下 `.idea` 的模块描述文件作为补充信号
    pub read_idea: bool,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            content_limit: DEFAULT_CONTENT_LIMIT,
            ignored_dirs: vec![".idea".into(), ".vscode".into(), ".git".into()],
            read_idea: true,
        }
    }
}

impl DetectOptions {
    /// 路径中是否包含被忽略的工具目录段
    pub(crate) fn is_in_ignored_dir(&self, rel: &Path) -> bool {
        rel.components().any(|c| {
            let part = c.as_os_str().to_string_lossy();
            self.ignored_dirs.iter().any(|d| d.as_str() == part)
        })
    }
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DetectStats {
    pub files_seen: usize,
    pub files_counted: usize,
    pub files_ignored: usize,
    pub unreadable: usize,
}

/// 一次运行的目录布局：缓存目录、结果目录与引擎版本分支
#[derive(Debug, Clone)]
pub struct RunLayout {
    pub cache_dir: PathBuf,
    pub results_dir: PathBuf,
    pub version_branch: String,
}

impl RunLayout {
    /// `version` 形如 `2023.2`，分支号取 `232`
    pub fn new(cache_dir: impl Into<PathBuf>, results_dir: impl Into<PathBuf>, version: &str) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            results_dir: results_dir.into(),
            version_branch: version_branch(version),
        }
    }

    pub fn system_dir(&self) -> PathBuf {
        self.cache_dir.join("idea").join(&self.version_branch)
    }

    pub fn plugins_dir(&self) -> PathBuf {
        self.cache_dir.join("plugins").join(&self.version_branch)
    }

    pub fn conf_dir(&self) -> PathBuf {
        self.cache_dir.join("config").join(&self.version_branch)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.results_dir.join("log")
    }

    /// 参数文件的固定路径（每次运行一份）
    pub fn vm_options_path(&self) -> PathBuf {
        self.conf_dir().join("ide.vmoptions")
    }

    /// 结果目录下的临时目录（统计事件文件等）
    pub fn tmp_results_dir(&self) -> PathBuf {
        self.results_dir.join("tmp")
    }
}

fn version_branch(version: &str) -> String {
    match version.split_once('.') {
        Some((year, minor)) if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) => {
            let minor = minor.split(['.', '-']).next().unwrap_or(minor);
            format!("{}{}", &year[2..], minor)
        }
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_branch_from_release() {
        assert_eq!(version_branch("2023.2"), "232");
        assert_eq!(version_branch("2024.1-eap"), "241");
        assert_eq!(version_branch("nightly"), "nightly");
        assert_eq!(version_branch("1é2.1"), "1é2.1");
        assert_eq!(version_branch("abcd.1"), "abcd.1");
    }

    #[test]
    fn layout_paths() {
        let layout = RunLayout::new("/cache", "/results", "2023.2");
        assert_eq!(layout.system_dir(), PathBuf::from("/cache/idea/232"));
        assert_eq!(layout.plugins_dir(), PathBuf::from("/cache/plugins/232"));
        assert_eq!(layout.log_dir(), PathBuf::from("/results/log"));
        assert_eq!(layout.vm_options_path(), PathBuf::from("/cache/config/232/ide.vmoptions"));
    }

    #[test]
    fn ignored_dir_matches_any_segment() {
        let opts = DetectOptions::default();
        assert!(opts.is_in_ignored_dir(Path::new("src/.git/objects/a")));
        assert!(opts.is_in_ignored_dir(Path::new(".idea")));
        assert!(!opts.is_in_ignored_dir(Path::new("src/git/main.go")));
    }
}
