//! 运行环境事实（统一在此读取环境变量）
use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::device::DeviceIdentity;

pub const ENV_DOCKER: &str = "LINTPICK_DOCKER";
pub const ENV_TREAT_AS_RELEASE: &str = "LINTPICK_TREAT_AS_RELEASE";
pub const ENV_TARGET_FRAMEWORKS: &str = "LINTPICK_NET_TARGET_FRAMEWORKS";
pub const ENV_REMOTE_URL: &str = "LINTPICK_REMOTE_URL";
pub const ENV_DEVICE_ID: &str = "DEVICEID";
pub const ENV_SALT: &str = "SALT";

/// 影响参数解析的环境开关
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuntimeEnv {
    /// 运行在隔离容器内
    pub in_container: bool,
    /// 按正式版许可处理
    pub treat_as_release: bool,
    /// 环境提供的 .NET 目标框架覆盖
    pub target_frameworks: Option<String>,
}

impl RuntimeEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意查找函数构建（测试时不必改动进程环境）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            in_container: non_empty(ENV_DOCKER).is_some(),
            treat_as_release: lookup(ENV_TREAT_AS_RELEASE).as_deref() == Some("true"),
            target_frameworks: non_empty(ENV_TARGET_FRAMEWORKS),
        }
    }
}

/// 是否运行在容器内
pub fn is_container() -> bool {
    RuntimeEnv::from_env().in_container
}

/// 项目远端仓库地址：环境变量优先，否则询问 git；失败返回空串
pub fn remote_url(project_dir: &Path) -> String {
    if let Ok(url) = std::env::var(ENV_REMOTE_URL) {
        if !url.trim().is_empty() {
            return url.trim().to_string();
        }
    }
    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .current_dir(project_dir)
        .output();
    match output {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout).trim().to_string(),
        Ok(out) => {
            debug!(status = ?out.status, "git remote get-url failed");
            String::new()
        }
        Err(err) => {
            debug!(%err, "git not available");
            String::new()
        }
    }
}

/// 读取环境中的 device id / salt，缺失部分由远端地址派生
pub fn device_identity(project_dir: &Path) -> DeviceIdentity {
    let device_id = std::env::var(ENV_DEVICE_ID).ok();
    let salt = std::env::var(ENV_SALT).ok();
    if device_id.as_deref().is_some_and(|s| !s.is_empty()) && salt.as_deref().is_some_and(|s| !s.is_empty()) {
        return DeviceIdentity::resolve(device_id.as_deref(), salt.as_deref(), "");
    }
    DeviceIdentity::resolve(device_id.as_deref(), salt.as_deref(), &remote_url(project_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        assert_eq!(RuntimeEnv::from_lookup(lookup(&[])), RuntimeEnv::default());
    }

    #[test]
    fn reads_switches() {
        let env = RuntimeEnv::from_lookup(lookup(&[
            (ENV_DOCKER, "1"),
            (ENV_TREAT_AS_RELEASE, "true"),
            (ENV_TARGET_FRAMEWORKS, "net8.0"),
        ]));
        assert!(env.in_container);
        assert!(env.treat_as_release);
        assert_eq!(env.target_frameworks.as_deref(), Some("net8.0"));
    }

    #[test]
    fn empty_values_are_absent() {
        let env = RuntimeEnv::from_lookup(lookup(&[
            (ENV_DOCKER, ""),
            (ENV_TREAT_AS_RELEASE, "yes"),
            (ENV_TARGET_FRAMEWORKS, ""),
        ]));
        assert_eq!(env, RuntimeEnv::default());
    }
}
