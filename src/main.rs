use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use tokio::signal;
use tracing::{error, info, warn};
use xaas_core::AppConfig;
use xaas_infrastructure::{init_logging, init_metrics};

mod app;
mod shutdown;

use app::Application;
use shutdown::ShutdownManager;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    // 加载配置
    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let mut config = AppConfig::load(config_path)
        .with_context(|| format!("加载配置失败: {}", config_path.unwrap_or("默认位置")))?;
    apply_cli_overrides(&mut config, &matches);
    config.validate()?;

    // 初始化日志系统
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    )?;

    info!("启动XSLT转换服务");
    info!("转换目录: {}", config.transforms.root.display());
    info!(
        "消息队列: {} 队列: {}",
        config.message_queue.display_target(),
        config.message_queue.queue
    );

    if config.observability.metrics_enabled {
        init_metrics(&config.observability.metrics_bind_address)?;
    }

    // 创建应用实例，转换加载失败时直接退出
    let app = Arc::new(Application::new(config).await?);

    // 创建优雅关闭管理器
    let shutdown_manager = ShutdownManager::new();

    // 启动应用
    let mut app_handle = {
        let shutdown_rx = shutdown_manager.subscribe().await;
        let app = Arc::clone(&app);

        tokio::spawn(async move { app.run(shutdown_rx).await })
    };

    // 等待关闭信号，应用也可能因消费失败自行退出
    let outcome = tokio::select! {
        _ = wait_for_shutdown_signal() => None,
        result = &mut app_handle => Some(result),
    };

    let outcome = match outcome {
        Some(result) => result,
        None => {
            info!("收到关闭信号，开始优雅关闭...");
            shutdown_manager.shutdown().await;

            // 等待应用关闭，设置超时
            match tokio::time::timeout(Duration::from_secs(30), app_handle).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("应用关闭超时，强制退出");
                    Ok(Ok(()))
                }
            }
        }
    };

    if let Err(e) = app.close().await {
        error!("关闭消息队列连接失败: {e}");
    }

    match outcome {
        Ok(Ok(())) => info!("应用已优雅关闭"),
        Ok(Err(e)) => {
            error!("应用运行失败: {e:#}");
            return Err(e);
        }
        Err(e) => {
            error!("应用任务异常退出: {e}");
            return Err(e.into());
        }
    }

    info!("XSLT转换服务已退出");
    Ok(())
}

fn cli() -> Command {
    Command::new("xaas")
        .version(env!("CARGO_PKG_VERSION"))
        .about("基于消息队列的XSLT转换服务")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式")
                .value_parser(["json", "pretty"]),
        )
        .arg(
            Arg::new("root")
                .short('r')
                .long("root")
                .value_name("DIR")
                .help("转换定义目录"),
        )
        .arg(
            Arg::new("queue")
                .short('q')
                .long("queue")
                .value_name("NAME")
                .help("请求队列名称"),
        )
}

/// 命令行参数优先于配置文件和环境变量
fn apply_cli_overrides(config: &mut AppConfig, matches: &ArgMatches) {
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.observability.log_level = level.clone();
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config.observability.log_format = format.clone();
    }
    if let Some(root) = matches.get_one::<String>("root") {
        config.transforms.root = PathBuf::from(root);
    }
    if let Some(queue) = matches.get_one::<String>("queue") {
        config.message_queue.queue = queue.clone();
    }
}

/// 等待关闭信号
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("安装SIGTERM信号处理器失败: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_take_precedence() {
        let matches = cli().get_matches_from([
            "xaas",
            "--root",
            "/srv/stylesheets",
            "--queue",
            "xaas.invoices",
            "--log-format",
            "json",
        ]);

        let mut config = AppConfig::default();
        apply_cli_overrides(&mut config, &matches);

        assert_eq!(config.transforms.root, PathBuf::from("/srv/stylesheets"));
        assert_eq!(config.message_queue.queue, "xaas.invoices");
        assert_eq!(config.observability.log_format, "json");
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_cli_without_overrides_keeps_config() {
        let matches = cli().get_matches_from(["xaas"]);

        let mut config = AppConfig::default();
        apply_cli_overrides(&mut config, &matches);

        assert_eq!(config.message_queue.queue, "xaas.transform");
        assert_eq!(config.observability.log_format, "pretty");
    }

    #[test]
    fn test_bundled_config_matches_defaults() {
        let config = AppConfig::from_toml(include_str!("../config/xaas.toml")).unwrap();
        let defaults = AppConfig::default();

        assert_eq!(config.message_queue.queue, defaults.message_queue.queue);
        assert_eq!(config.message_queue.auto_delete, defaults.message_queue.auto_delete);
        assert_eq!(config.transforms.root, defaults.transforms.root);
        assert_eq!(config.transforms.processor.args, defaults.transforms.processor.args);
    }

    #[test]
    fn test_cli_rejects_unknown_log_format() {
        assert!(cli()
            .try_get_matches_from(["xaas", "--log-format", "xml"])
            .is_err());
    }
}
