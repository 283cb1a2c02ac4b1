//! 引擎运行参数解析
//!
//! 三层合并：默认值 < 项目配置 < 显式参数，逐键后写者胜。
//! 输出为排序后的 `key=value` / 裸参数行，写入单个参数文件，文件路径通过环境变量交给引擎进程。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::device::DeviceIdentity;
use crate::env::RuntimeEnv;
use crate::error::{Error, Result};
use crate::linters::EngineFamily;
use crate::options::RunLayout;
use crate::types::DotNetOptions;

/// 容器内不分析 .NET Framework 目标
pub const DOTNET_FRAMEWORK_DENYLIST: &str =
    "!net48;!net472;!net471;!net47;!net462;!net461;!net46;!net452;!net451;!net45;!net403;!net40;!net35;!net20;!net11";
const CONTAINER_JVM_DEBUG_PORT: u16 = 5005;
const MAX_RAM_PERCENTAGE: &str = "70";
const PROPERTY_PREFIX: &str = "-D";

/// 参数解析所需的运行上下文
#[derive(Debug, Clone)]
pub struct ResolveContext {
    pub layout: RunLayout,
    pub family: EngineFamily,
    pub device: DeviceIdentity,
    /// 本次分析的稳定标识
    pub analysis_id: String,
    pub coverage_dir: Option<PathBuf>,
    /// 需要的插件 ID
    pub plugins: Vec<String>,
    pub dotnet: DotNetOptions,
    /// 是否允许发送统计（来自许可信息）
    pub statistics_allowed: bool,
    /// 大于 0 时开启调试端口
    pub jvm_debug_port: u16,
    pub custom_plugins_dir: Option<PathBuf>,
    pub env: RuntimeEnv,
}

/// 显式（命令行）参数：`k=v` 进入映射，其余为裸参数行
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExplicitOptions {
    pub properties: BTreeMap<String, String>,
    pub flags: Vec<String>,
}

impl ExplicitOptions {
    pub fn parse<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = ExplicitOptions::default();
        for token in tokens {
            let token = token.as_ref().trim();
            if token.is_empty() {
                continue;
            }
            match token.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    out.properties.insert(key.to_string(), value.to_string());
                }
                _ => out.flags.push(token.to_string()),
            }
        }
        out
    }
}

/// 参数文件已写出：引擎通过 `variable` 环境变量找到 `path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedOptions {
    pub variable: &'static str,
    pub path: PathBuf,
}

impl PublishedOptions {
    /// 写入当前进程环境，由随后启动的引擎进程继承
    pub fn export(&self) {
        std::env::set_var(self.variable, &self.path);
    }
}

/// 含空格的值加双引号
pub fn quote_if_space(s: &str) -> String {
    if s.contains(' ') {
        format!("\"{s}\"")
    } else {
        s.to_string()
    }
}

fn quote_path(p: &Path) -> String {
    quote_if_space(&p.display().to_string())
}

/// 默认属性映射（含 .NET 属性注入）
pub fn default_properties(ctx: &ResolveContext) -> BTreeMap<String, String> {
    let mut props: BTreeMap<String, String> = BTreeMap::new();
    let mut set = |k: &str, v: String| {
        props.insert(k.to_string(), v);
    };
    set("-Didea.headless.enable.statistics", ctx.statistics_allowed.to_string());
    set("-Didea.headless.statistics.device.id", ctx.device.device_id.clone());
    set("-Didea.headless.statistics.salt", ctx.device.salt.clone());
    set("-Didea.config.path", quote_path(&ctx.layout.conf_dir()));
    set("-Didea.system.path", quote_path(&ctx.layout.system_dir()));
    set("-Didea.plugins.path", quote_path(&ctx.layout.plugins_dir()));
    set("-Didea.log.path", quote_path(&ctx.layout.log_dir()));
    set("-Dqodana.automation.guid", quote_if_space(&ctx.analysis_id));
    set("-XX:MaxRAMPercentage", MAX_RAM_PERCENTAGE.to_string());

    if let Some(coverage) = ctx.coverage_dir.as_deref().filter(|p| !p.as_os_str().is_empty()) {
        set("-Dqodana.coverage.input", quote_path(coverage));
    }
    if !ctx.plugins.is_empty() {
        set("-Didea.required.plugins.id", ctx.plugins.join(","));
    }

    if ctx.family.is_rider() {
        inject_dotnet(&mut props, &ctx.dotnet, &ctx.env);
    }

    debug!(?props, "default properties");
    props
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

/// 优先级：Project > Solution；随后 Configuration / Platform；
/// 目标框架：显式值 > 环境覆盖 > 仅容器内的旧框架排除列表
fn inject_dotnet(props: &mut BTreeMap<String, String>, dotnet: &DotNetOptions, env: &RuntimeEnv) {
    if let Some(project) = non_empty(&dotnet.project) {
        props.insert("-Dqodana.net.project".into(), quote_if_space(project));
    } else if let Some(solution) = non_empty(&dotnet.solution) {
        props.insert("-Dqodana.net.solution".into(), quote_if_space(solution));
    }
    if let Some(configuration) = non_empty(&dotnet.configuration) {
        props.insert("-Dqodana.net.configuration".into(), quote_if_space(configuration));
    }
    if let Some(platform) = non_empty(&dotnet.platform) {
        props.insert("-Dqodana.net.platform".into(), quote_if_space(platform));
    }
    if let Some(frameworks) = non_empty(&dotnet.frameworks).or(non_empty(&env.target_frameworks)) {
        props.insert("-Dqodana.net.targetFrameworks".into(), quote_if_space(frameworks));
    } else if env.in_container {
        props.insert("-Dqodana.net.targetFrameworks".into(), DOTNET_FRAMEWORK_DENYLIST.into());
    }
}

/// 自定义插件目录下所有条目的绝对路径（排序后逗号连接）
/// - 目录不存在：None
/// - 目录存在但不可读：可恢复错误 `Error::CustomPlugins`
/// - 相对目录按当前工作目录补全（引擎进程的工作目录不同）
fn custom_plugin_paths(dir: &Path) -> Result<Option<String>> {
    if !dir.exists() {
        return Ok(None);
    }
    let absolute;
    let dir = if dir.is_absolute() {
        dir
    } else {
        let cwd = std::env::current_dir().map_err(|source| Error::CustomPlugins { path: dir.to_path_buf(), source })?;
        absolute = cwd.join(dir);
        absolute.as_path()
    };
    let entries = std::fs::read_dir(dir).map_err(|source| Error::CustomPlugins { path: dir.to_path_buf(), source })?;
    let mut paths: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Error::CustomPlugins { path: dir.to_path_buf(), source })?;
        paths.push(dir.join(entry.file_name()).display().to_string());
    }
    if paths.is_empty() {
        return Ok(None);
    }
    paths.sort();
    Ok(Some(paths.join(",")))
}

fn base_lines(ctx: &ResolveContext) -> Result<Vec<String>> {
    let mut lines = vec![format!("-Xlog:gc*:{}", quote_path(&ctx.layout.log_dir().join("gc.log")))];
    if ctx.jvm_debug_port > 0 {
        lines.push(format!(
            "-agentlib:jdwp=transport=dt_socket,server=y,suspend=y,address=*:{CONTAINER_JVM_DEBUG_PORT}"
        ));
    }
    if ctx.env.treat_as_release {
        lines.push("-Deap.require.license=release".to_string());
    }
    if let Some(dir) = &ctx.custom_plugins_dir {
        if let Some(paths) = custom_plugin_paths(dir)? {
            lines.push(format!("-Dplugin.path={paths}"));
        }
    }
    Ok(lines)
}

/// 非 `-` 开头的键补上 `-D`
fn property_key(key: &str) -> String {
    if key.starts_with('-') {
        key.to_string()
    } else {
        format!("{PROPERTY_PREFIX}{key}")
    }
}

/// 解析最终参数行（排序后）
pub fn resolve(
    project: &BTreeMap<String, String>,
    explicit: &ExplicitOptions,
    ctx: &ResolveContext,
) -> Result<Vec<String>> {
    let mut lines = base_lines(ctx)?;

    // 显式裸参数按原文去重
    for flag in &explicit.flags {
        if !flag.is_empty() && !lines.contains(flag) {
            lines.push(flag.clone());
        }
    }

    let mut props = default_properties(ctx);
    for (k, v) in project {
        props.insert(property_key(k), v.clone());
    }
    for (k, v) in &explicit.properties {
        props.insert(property_key(k), v.clone());
    }

    lines.extend(props.into_iter().map(|(k, v)| format!("{k}={v}")));
    lines.sort();
    Ok(lines)
}

/// 写出参数文件（换行连接）并返回环境引用；写失败对本次运行是致命的
pub fn write_properties(lines: &[String], path: &Path, family: EngineFamily) -> Result<PublishedOptions> {
    let wrap = |source| Error::WriteOptions { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(wrap)?;
    }
    std::fs::write(path, lines.join("\n")).map_err(wrap)?;
    let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    debug!(path = %path.display(), lines = lines.len(), "options file written");
    Ok(PublishedOptions { variable: family.vm_options_env(), path })
}
