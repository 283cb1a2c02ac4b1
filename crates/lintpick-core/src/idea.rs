//! IDE 项目元数据（.idea/*.iml）补充信号
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::markers::{MarkerSet, IML_MARKERS};
use crate::options::DetectStats;
use crate::rank::append_unique;

const IDEA_DIR: &str = ".idea";
const MODULE_EXT: &str = "iml";

/// 读取 `<project>/.idea` 下的模块描述文件，返回按首次发现顺序排列的语言
/// - 目录不存在：无补充信号，返回空
/// - 单个文件不可读：跳过
pub fn read_idea_dir(project: &Path) -> Vec<String> {
    scan_idea_dir(project, &mut DetectStats::default())
}

pub(crate) fn scan_idea_dir(project: &Path, stats: &mut DetectStats) -> Vec<String> {
    let root = project.join(IDEA_DIR);
    if !root.is_dir() {
        return Vec::new();
    }
    let markers = MarkerSet::build(IML_MARKERS);
    let mut languages: Vec<String> = Vec::new();

    // 按文件名排序遍历，保证“首次发现顺序”可复现
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                debug!(%err, "skipping unreadable .idea entry");
                stats.unreadable += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some(MODULE_EXT) {
            continue;
        }
        let text = match std::fs::read(entry.path()) {
            Ok(t) => t,
            Err(err) => {
                warn!(path = %entry.path().display(), %err, "cannot read module file");
                stats.unreadable += 1;
                continue;
            }
        };
        let found = markers.labels_in(&text).into_iter().map(str::to_string);
        append_unique(&mut languages, found);
    }

    debug!(?languages, "languages from .idea");
    languages
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_idea_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_idea_dir(dir.path()).is_empty());
    }

    #[test]
    fn modules_in_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        let idea = dir.path().join(".idea");
        fs::create_dir_all(idea.join("modules")).unwrap();
        fs::write(idea.join("a.iml"), r#"<module type="PYTHON_MODULE"/>"#).unwrap();
        fs::write(idea.join("modules/b.iml"), r#"<module type="JAVA_MODULE"/><component name="Go"/>"#).unwrap();
        fs::write(idea.join("workspace.xml"), "JAVA_MODULE").unwrap();
        assert_eq!(read_idea_dir(dir.path()), vec!["Python", "Java", "Go"]);
    }
}
