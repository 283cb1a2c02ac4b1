use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lintpick_core::{
    all_images, common_event_data, detect_with, device_identity, flush_events, has_files,
    load_project_config, os_info, project_closed, project_opened, resolve, select_candidates,
    write_properties, DetectOptions, EngineCandidate, EventQueue, ExitStatus, ExplicitOptions,
    HeuristicOracle, ResolveContext, RunLayout, RuntimeEnv, StatisticsPolicy, RELEASE_VERSION,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "lintpick", version, about = "检测项目语言、选择分析引擎并生成引擎运行参数")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描项目并输出语言排名
    Detect {
        /// 项目目录
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// 以 JSON 输出（含计数与统计）
        #[arg(long)]
        json: bool,
    },
    /// 列出适用于项目的引擎候选
    Linters {
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// 忽略项目，列出全部受支持镜像
        #[arg(long)]
        all: bool,
    },
    /// 解析引擎参数并写出参数文件
    Configure {
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// 指定引擎（代码或镜像名）；缺省时依次取项目配置、扫描结果首选
        #[arg(long)]
        linter: Option<String>,

        /// 缓存目录（系统、插件、配置目录位于其下）
        #[arg(long, default_value = "./.lintpick/cache")]
        cache_dir: PathBuf,

        /// 结果目录（日志与统计事件）
        #[arg(long, default_value = "./.lintpick/results")]
        results_dir: PathBuf,

        /// 显式参数：`key=value` 或裸参数行，可重复
        #[arg(short = 'p', long = "property")]
        property: Vec<String>,

        #[arg(long)]
        coverage_dir: Option<PathBuf>,

        /// 大于 0 时开启 JVM 调试端口
        #[arg(long, default_value_t = 0)]
        jvm_debug_port: u16,

        #[arg(long)]
        custom_plugins_dir: Option<PathBuf>,

        /// 本次分析标识；缺省使用统计会话 ID
        #[arg(long)]
        analysis_id: Option<String>,

        /// 许可允许发送统计
        #[arg(long)]
        statistics_allowed: bool,

        /// 不写出统计事件
        #[arg(long)]
        no_statistics: bool,

        /// 项目 ID 哈希（写入统计事件）
        #[arg(long)]
        project_id_hash: Option<String>,
    },
    /// 解释引擎进程退出码
    Explain {
        code: i32,
    },
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Detect { project, json } => {
            let detection = detect_with(&project, &DetectOptions::default(), &HeuristicOracle::new())
                .with_context(|| format!("scan {}", project.display()))?;
            if json {
                let counts: std::collections::BTreeMap<_, _> = detection.counts.iter().collect();
                let value = serde_json::json!({
                    "languages": detection.languages,
                    "counts": counts,
                    "filesSeen": detection.stats.files_seen,
                    "filesCounted": detection.stats.files_counted,
                    "filesIgnored": detection.stats.files_ignored,
                    "unreadable": detection.stats.unreadable,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                for lang in &detection.languages {
                    match detection.counts.get(lang) {
                        Some(n) => println!("{lang}\t{n}"),
                        None => println!("{lang}\t(.idea)"),
                    }
                }
            }
        }
        Commands::Linters { project, all } => {
            if all {
                for image in all_images() {
                    println!("{image}");
                }
            } else {
                let languages = detect_languages(&project)?;
                for candidate in select_candidates(&languages) {
                    println!("{candidate}");
                }
            }
        }
        Commands::Configure {
            project,
            linter,
            cache_dir,
            results_dir,
            property,
            coverage_dir,
            jvm_debug_port,
            custom_plugins_dir,
            analysis_id,
            statistics_allowed,
            no_statistics,
            project_id_hash,
        } => {
            if !has_files(&project) {
                bail!("no files to analyse in {}", project.display());
            }
            let config = load_project_config(&project).context("load project config")?;

            let queue = EventQueue::start();
            let events = queue.sender();
            let data = common_event_data(RELEASE_VERSION, project_id_hash.as_deref());
            events.send(project_opened(data.clone()));
            events.send(os_info(data.clone()));

            let candidate = pick_linter(&project, linter.as_deref(), config.linter.as_deref())?;
            info!(linter = %candidate, family = ?candidate.family(), "selected linter");

            let ctx = ResolveContext {
                layout: RunLayout::new(&cache_dir, &results_dir, RELEASE_VERSION),
                family: candidate.family(),
                device: device_identity(&project),
                analysis_id: analysis_id.unwrap_or_else(|| queue.session_id().to_string()),
                coverage_dir,
                plugins: config.plugin_ids(),
                dotnet: config.dotnet.clone(),
                statistics_allowed,
                jvm_debug_port,
                custom_plugins_dir,
                env: RuntimeEnv::from_env(),
            };
            let explicit = ExplicitOptions::parse(&property);
            let lines = resolve(&config.properties, &explicit, &ctx).context("resolve engine options")?;
            let published = write_properties(&lines, &ctx.layout.vm_options_path(), ctx.family)
                .context("write engine options")?;
            published.export();
            info!(variable = published.variable, path = %published.path.display(), lines = lines.len(), "options written");
            println!("{}={}", published.variable, published.path.display());

            events.send(project_closed(data));
            let buffered = queue.finish();
            let policy = StatisticsPolicy { no_statistics, allowed: statistics_allowed };
            match flush_events(&buffered, &ctx.layout.tmp_results_dir(), policy) {
                Ok(Some(path)) => info!(path = %path.display(), events = buffered.len(), "statistics saved"),
                Ok(None) => {}
                Err(err) => warn!(%err, "failed to save statistics"),
            }
        }
        Commands::Explain { code } => {
            let status = ExitStatus::from_code(code);
            println!("{status}");
            if status.is_failure() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 支持通过环境变量 RUST_LOG 控制日志等级，如：RUST_LOG=debug
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).with_writer(std::io::stderr).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn detect_languages(project: &Path) -> Result<Vec<String>> {
    let detection = detect_with(project, &DetectOptions::default(), &HeuristicOracle::new())
        .with_context(|| format!("scan {}", project.display()))?;
    info!(
        languages = ?detection.languages,
        files_counted = detection.stats.files_counted,
        files_ignored = detection.stats.files_ignored,
        "scan finished"
    );
    Ok(detection.languages)
}

/// 命令行 > 项目配置 > 扫描结果首选
fn pick_linter(project: &Path, explicit: Option<&str>, configured: Option<&str>) -> Result<EngineCandidate> {
    if let Some(id) = explicit.or(configured) {
        return EngineCandidate::parse(id).with_context(|| format!("unknown linter `{id}`"));
    }
    let languages = detect_languages(project)?;
    match select_candidates(&languages).into_iter().next() {
        Some(candidate) => Ok(candidate),
        None => bail!("no supported linter for detected languages {languages:?}"),
    }
}
