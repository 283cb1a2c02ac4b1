//! 项目级配置文件加载（TOML）
//!
//! 文件位于项目根目录，随项目一起提交；优先级低于命令行显式参数。
//!
//! ```toml
//! linter = "jetbrains/qodana-jvm:2023.2"
//!
//! [properties]
//! "idea.log.level" = "debug"
//! "-XX:MaxRAMPercentage" = 80
//!
//! [dotnet]
//! solution = "App.sln"
//!
//! [[plugins]]
//! id = "org.intellij.scala"
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::DotNetOptions;

/// 按顺序查找的配置文件名
pub const CONFIG_FILE_NAMES: &[&str] = &["lintpick.toml", ".lintpick.toml"];

/// 插件引用
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PluginRef {
    pub id: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// 顶层配置文件结构
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    linter: Option<String>,
    #[serde(default)]
    properties: BTreeMap<String, toml::Value>,
    #[serde(default)]
    dotnet: DotNetOptions,
    #[serde(default)]
    plugins: Vec<PluginRef>,
}

/// 归一化后的项目配置（属性值统一为字符串）
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProjectConfig {
    pub path: Option<PathBuf>,
    pub linter: Option<String>,
    pub properties: BTreeMap<String, String>,
    pub dotnet: DotNetOptions,
    pub plugins: Vec<PluginRef>,
}

impl ProjectConfig {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self> {
        let parsed: ConfigFile = toml::from_str(text).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut properties = BTreeMap::new();
        for (key, value) in parsed.properties {
            let value = scalar_to_string(&value).ok_or_else(|| Error::Config {
                path: path.to_path_buf(),
                message: format!("property `{key}` must be a string, number or boolean"),
            })?;
            properties.insert(key, value);
        }

        Ok(Self {
            path: Some(path.to_path_buf()),
            linter: parsed.linter.filter(|l| !l.trim().is_empty()),
            properties,
            dotnet: parsed.dotnet,
            plugins: parsed.plugins,
        })
    }

    /// 需要引擎预装的插件 ID（去重，保序）
    pub fn plugin_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for p in &self.plugins {
            if !p.id.is_empty() && !ids.contains(&p.id) {
                ids.push(p.id.clone());
            }
        }
        ids
    }
}

/// 从项目根目录加载配置；找不到文件时返回空配置
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig> {
    for name in CONFIG_FILE_NAMES {
        let path = project_dir.join(name);
        if path.is_file() {
            let text = std::fs::read_to_string(&path)?;
            let config = ProjectConfig::from_toml_str(&text, &path)?;
            debug!(path = %path.display(), properties = config.properties.len(), "loaded project config");
            return Ok(config);
        }
    }
    Ok(ProjectConfig::default())
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let text = r#"
linter = "jetbrains/qodana-dotnet:2023.2"

[properties]
"idea.log.level" = "debug"
"-XX:MaxRAMPercentage" = 80
"qodana.enabled" = true

[dotnet]
solution = "App.sln"
configuration = "Release"

[[plugins]]
id = "org.intellij.scala"

[[plugins]]
id = "org.intellij.scala"
version = "2023.2.1"

[[plugins]]
id = "Pythonid"
"#;
        let cfg = ProjectConfig::from_toml_str(text, Path::new("lintpick.toml")).unwrap();
        assert_eq!(cfg.linter.as_deref(), Some("jetbrains/qodana-dotnet:2023.2"));
        assert_eq!(cfg.properties["idea.log.level"], "debug");
        assert_eq!(cfg.properties["-XX:MaxRAMPercentage"], "80");
        assert_eq!(cfg.properties["qodana.enabled"], "true");
        assert_eq!(cfg.dotnet.solution.as_deref(), Some("App.sln"));
        assert_eq!(cfg.dotnet.project, None);
        assert_eq!(cfg.plugin_ids(), vec!["org.intellij.scala", "Pythonid"]);
    }

    #[test]
    fn rejects_nested_property_values() {
        let text = "[properties]\nkey = [1, 2]\n";
        let err = ProjectConfig::from_toml_str(text, Path::new("lintpick.toml")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_project_config(dir.path()).unwrap(), ProjectConfig::default());
    }

    #[test]
    fn hidden_file_name_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".lintpick.toml"), "linter = \"QDNET\"\n").unwrap();
        let cfg = load_project_config(dir.path()).unwrap();
        assert_eq!(cfg.linter.as_deref(), Some("QDNET"));
        assert!(cfg.path.is_some());
    }
}
