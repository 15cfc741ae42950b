//! # Seed Data Generator
//!
//! Populates the database with test products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p ordena-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p ordena-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p ordena-db --bin seed -- --db ./data/ordena.db
//! ```
//!
//! ## Generated Products
//! Creates realistic catalog data across categories (informática,
//! periféricos, áudio, escritório, acessórios), each with a random price
//! between R$ 9,90 and R$ 1.999,90.

use ordena_core::ProductStatus;
use ordena_db::{Database, DbConfig};
use std::env;

/// Product categories with base names for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Informática",
        &[
            "Notebook",
            "Monitor 24\"",
            "Monitor 27\"",
            "SSD 512GB",
            "SSD 1TB",
            "Memória RAM 16GB",
            "Placa de Vídeo",
            "Roteador Wi-Fi",
            "Switch 8 portas",
            "Fonte 650W",
        ],
    ),
    (
        "Periféricos",
        &[
            "Teclado Mecânico",
            "Teclado sem Fio",
            "Mouse Gamer",
            "Mouse sem Fio",
            "Mousepad",
            "Webcam Full HD",
            "Hub USB-C",
            "Leitor de Cartões",
        ],
    ),
    (
        "Áudio",
        &[
            "Headset Gamer",
            "Fone Bluetooth",
            "Caixa de Som",
            "Microfone Condensador",
            "Soundbar",
        ],
    ),
    (
        "Escritório",
        &[
            "Cadeira Ergonômica",
            "Mesa para Escritório",
            "Suporte de Monitor",
            "Luminária de Mesa",
            "Organizador de Cabos",
        ],
    ),
    (
        "Acessórios",
        &[
            "Cabo HDMI 2m",
            "Cabo USB-C 1m",
            "Carregador 65W",
            "Mochila para Notebook",
            "Película de Monitor",
        ],
    ),
];

/// Variant suffixes to multiply the base names
const VARIANTS: &[&str] = &["", " Pro", " Slim", " Plus", " RGB", " Compact"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "./ordena_dev.db".to_string());

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Ordena Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: $DATABASE_PATH or ./ordena_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Ordena Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    // Connect to database (runs migrations)
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (category, names) in CATEGORIES {
        for name in *names {
            for variant in VARIANTS {
                if generated >= count {
                    break 'outer;
                }

                let title = format!("{name}{variant}");
                // R$ 9,90 to R$ 1.999,90
                let price_cents = 990 + (rand::random::<u32>() % 199_901) as i64;

                if let Err(e) = db
                    .products()
                    .insert(&title, None, price_cents, Some(category), ProductStatus::Active)
                    .await
                {
                    eprintln!("Failed to insert {}: {}", title, e);
                    continue;
                }

                generated += 1;
                if generated % 50 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:.2}s", generated, elapsed.as_secs_f64());

    db.close().await;
    Ok(())
}
