use todo_api::infra::config;
use todo_api::{DatabaseService, TodoStore};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight\n\
         \n\
         Requires env vars:\n\
           DATABASE_URL\n\
         Optional:\n\
           BIND_ADDR, DB_MAX_CONNECTIONS, DB_MAX_IDLE_TIME_SECS, APP_ENV\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    // Force-read config (nice error messages if missing or malformed)
    let _ = config::database_url()?;
    let max_connections = config::db_max_connections()?;
    let idle = config::db_max_idle_time()?;

    println!("> Preflight:");
    println!("  BIND_ADDR={}", config::bind_addr());
    println!("  APP_ENV={}", config::environment());
    println!("  DB_MAX_CONNECTIONS={}", max_connections);
    println!("  DB_MAX_IDLE_TIME_SECS={}", idle.as_secs());

    let db_service = DatabaseService::new().await?;
    println!("> Connected; todo table and title index are in place.");

    db_service
        .todo_store()
        .ping()
        .await
        .map_err(|e| anyhow::anyhow!("store ping failed: {}", e))?;
    println!("> Store ping OK.");

    Ok(())
}
