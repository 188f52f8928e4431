use car_registry::infra::config::{Config, StorageBackend};
use car_registry::{PgGateway, RecordGateway};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight\n\
         \n\
         Reads env vars (or .env):\n\
           DATABASE_URL, STORAGE_BACKEND, BIND_ADDR, DB_MAX_CONNECTIONS\n\
         Connects to the database, creates the people/cars tables if missing\n\
         and reports row counts.\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    let config = Config::from_env()?;

    println!("> Preflight:");
    println!("  STORAGE_BACKEND={:?}", config.storage);
    println!("  BIND_ADDR={}", config.bind_addr);
    println!("  DB_MAX_CONNECTIONS={}", config.db_max_connections);

    if config.storage == StorageBackend::Memory {
        println!("  In-memory storage selected; nothing to check.");
        println!("> Preflight OK.");
        return Ok(());
    }

    let gateway = PgGateway::connect(config.database_url()?, config.db_max_connections)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to DATABASE_URL: {}", e))?;
    gateway.ping().await?;
    println!("  Database reachable; schema ensured.");

    let (people, cars) = gateway.table_counts().await?;
    println!("  people rows: {}", people);
    println!("  cars rows:   {}", cars);

    println!("> Preflight OK.");
    Ok(())
}
