//! EHR影像服务器主程序

mod config;

use anyhow::Context;
use clap::Parser;
use ehr_analysis::AnalysisEngine;
use ehr_web::{AppState, PatientDirectory, TemplateSummarizer, WebServer};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info};

use crate::config::EhrConfig;

/// EHR影像服务器命令行参数
#[derive(Parser, Debug)]
#[command(name = "ehr-server")]
#[command(about = "AI Enhanced EHR imaging & documentation server")]
struct Args {
    /// 监听主机
    #[arg(long)]
    host: Option<String>,

    /// 服务器端口
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别
    #[arg(short, long)]
    log_level: Option<String>,
}

impl Args {
    /// 命令行参数覆盖配置
    fn apply(&self, config: &mut EhrConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = EhrConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(config.logging.level.as_str())
        .init();

    info!("启动EHR影像服务器...");
    match &args.config {
        Some(path) => info!("配置文件: {}", path.display()),
        None => info!("未指定配置文件，使用默认值和环境变量"),
    }

    config.validate()?;

    let engine = match &config.analysis.rules_file {
        Some(path) => AnalysisEngine::from_file(path)
            .with_context(|| format!("Failed to load rule file {}", path.display()))?,
        None => AnalysisEngine::standard(),
    };

    let patients = match &config.patients.seed_file {
        Some(path) => PatientDirectory::from_file(path)
            .with_context(|| format!("Failed to load patient seed file {}", path.display()))?,
        None => PatientDirectory::demo(),
    };

    let summarizer = TemplateSummarizer::new(
        config.summary.prefix.clone(),
        config.summary.suffix.clone(),
        config.summary.max_chars,
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid listen address")?;

    info!("EHR影像服务器配置:");
    info!("  监听地址: {}", addr);
    info!("  诊断规则: {} 条", engine.rules().rules().len());
    info!("  患者数量: {}", patients.len());
    info!("  影像目录: {}", config.web.images_dir.display());

    let state = AppState::new(engine, summarizer, patients);
    let server = WebServer::new(addr, state, &config.web_config());

    if let Err(e) = server.run().await {
        error!("服务器运行失败: {}", e);
        return Err(e.into());
    }

    Ok(())
}
