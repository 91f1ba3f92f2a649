use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;

use todo_backend::application::todo_service::{TodoService, TodoServiceImpl};
use todo_backend::config::{Cli, Config, DbType};
use todo_backend::domain::repository::TodoRepository;
use todo_backend::http::routes::todos;
use todo_backend::http::routing;
use todo_backend::infrastructure::{json_repo::JsonTodoRepository, sqlite_repo::SqliteTodoRepository};
use todo_backend::{logging, version};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if cli.version {
        println!("{}", version::print("todo"));
        return Ok(());
    }

    let _log_guard = logging::init(&cli.log, cli.debug)?;
    let config = Config::load(&cli.config)?;

    let result = match config.db_type {
        DbType::Json => {
            let repo = JsonTodoRepository::open_path(&cli.db)
                .with_context(|| format!("could not open json repository {}", cli.db.display()))?;
            serve(repo, &config).await
        }
        DbType::Sqlite => {
            let url = config.database_url.as_deref().context("`databaseUrl` is not configured")?;
            let repo = SqliteTodoRepository::connect(url).await.context("could not connect to sqlite")?;
            repo.init().await.context("could not initialise sqlite schema")?;
            serve(repo, &config).await
        }
    };
    if let Err(e) = &result {
        tracing::error!(error = %format!("{e:#}"), "exiting");
    }
    result
}

async fn serve<R: TodoRepository + Clone>(repo: R, config: &Config) -> anyhow::Result<()> {
    let service = TodoServiceImpl::new(repo);
    let router = routing::app(todos::router(todos::AppState { service: service.clone() }));

    let addr: SocketAddr = config.addr.parse().with_context(|| format!("invalid listen address {}", config.addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("could not bind {addr}"))?;
    tracing::info!(%addr, db_type = ?config.db_type, "listening");
    let served = axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await;
    finish(served, &service).await
}

/// Releases the repository whether or not the server exited cleanly; a server
/// error takes precedence over a shutdown error.
async fn finish<S: TodoService>(served: std::io::Result<()>, service: &S) -> anyhow::Result<()> {
    let closed = service.shutdown().await;
    served.context("server error")?;
    closed.context("could not shut down repository")?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
