use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod picker;
mod state;

use cli::{Cli, Commands};
use readmore_backend::config::{self, AppConfig};
use readmore_backend::search::{
    BatchReport, BatchSearcher, ContentIndex, DbContentIndex, IncrementalSearchController,
    RestContentIndex, SearchError,
};
use state::AppState;

/// Open the local content database / 打开本地内容库
async fn open_database(app_config: &AppConfig) -> anyhow::Result<DbContentIndex> {
    // Create data directory if not exists / 创建数据目录
    let data_dir = app_config.get_data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Created data directory: {:?}", data_dir);
    }

    Ok(DbContentIndex::connect(&app_config.get_database_url()).await?)
}

/// Batch search, printed the way the command line tool always has / 批量搜索
async fn run_search(
    app_config: &AppConfig,
    date_after: Option<String>,
    date_before: Option<String>,
    marker: Option<String>,
) -> anyhow::Result<ExitCode> {
    let index = Arc::new(open_database(app_config).await?);
    let marker = marker.unwrap_or_else(|| app_config.search.marker.clone());

    let searcher = BatchSearcher::new(index.clone(), marker)
        .with_window_days(app_config.search.default_window_days)
        .on_report(Arc::new(|report: &BatchReport| match report {
            BatchReport::Matches { .. } => println!("Success: {}", report),
            _ => println!("{}", report),
        }));

    let result = searcher.run(date_after.as_deref(), date_before.as_deref()).await;
    index.close().await;

    match result {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e @ SearchError::InvalidDateFormat { .. }) => {
            println!("Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

/// Serve the content API / 启动内容服务
async fn run_serve(app_config: &AppConfig) -> anyhow::Result<ExitCode> {
    let index = open_database(app_config).await?;
    let state = Arc::new(AppState::new(Arc::new(index), app_config.search.clone()));
    let app = api::router(state);

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(ExitCode::SUCCESS)
}

/// Interactive picker over stdin / 交互式选择
async fn run_pick(app_config: &AppConfig, endpoint: Option<String>) -> anyhow::Result<ExitCode> {
    let index: Arc<dyn ContentIndex> = match endpoint {
        Some(endpoint) => Arc::new(
            RestContentIndex::new(&endpoint, app_config.client_timeout())?
                .with_page_limit(app_config.search.page_size_limit()),
        ),
        None => Arc::new(open_database(app_config).await?),
    };
    tracing::info!("Picking from {} index", index.name());

    let controller =
        IncrementalSearchController::spawn(index, app_config.search.controller_options());
    let mut stdout = tokio::io::stdout();
    picker::run(&controller, BufReader::new(tokio::io::stdin()), &mut stdout).await?;
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // stdout carries command output, logs go to stderr / 日志输出到 stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "readmore_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration / 加载配置
    config::init_config().map_err(anyhow::Error::msg)?;
    let app_config = config::config();

    match cli.command {
        Commands::Search { date_after, date_before, marker } => {
            run_search(&app_config, date_after, date_before, marker).await
        }
        Commands::Serve => run_serve(&app_config).await,
        Commands::Pick { endpoint } => {
            let endpoint = endpoint.or_else(|| {
                let configured = app_config.client.endpoint.trim();
                // An empty configured endpoint means the local database
                (!configured.is_empty()).then(|| configured.to_string())
            });
            run_pick(&app_config, endpoint).await
        }
    }
}
