use clap::Parser;
use serde::Serialize;
use shapeshift::{AnyValue, BoxError, Callback, Config, FieldType, Mapper, Record};

#[derive(Parser)]
#[command(name = "shapeshift-demo", about = "Map sample records with a configurable mapper")]
struct Cli {
    /// Path to a TOML file with mapper toggles. Defaults apply when omitted.
    #[arg(long, env = "SHAPESHIFT_CONFIG")]
    config: Option<String>,
}

#[derive(Debug, Default, Record)]
pub struct Person {
    pub name: String,
    pub phone_number: String,
    pub age: u8,
    pub height_cm: f32,
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Serialize, Record)]
pub struct User {
    #[shapeshift("name,required,callback:uppercase")]
    pub username: String,
    #[shapeshift("PhoneNumber,len=10")]
    pub phone: String,
    #[shapeshift(",gte=18")]
    pub age: i32,
    #[shapeshift("height_cm")]
    pub height: String,
    #[shapeshift(",unique")]
    pub tags: Vec<String>,
    #[shapeshift("-")]
    pub session: Option<String>,
}

#[derive(Debug, Default, Record)]
pub struct LineItem {
    pub sku: String,
    pub quantity: u32,
    pub unit_price: f64,
}

#[derive(Debug, Default, Record)]
pub struct Order {
    pub id: u64,
    pub customer: String,
    pub items: Vec<LineItem>,
}

#[derive(Debug, Default, Serialize, Record)]
pub struct InvoiceLine {
    #[shapeshift("sku,required")]
    pub product: String,
    #[shapeshift("quantity,gt=0")]
    pub count: i64,
    #[shapeshift("unit_price")]
    pub price: String,
}

#[derive(Debug, Default, Serialize, Record)]
pub struct Invoice {
    #[shapeshift("id")]
    pub number: String,
    pub customer: String,
    #[shapeshift("items,len=2")]
    pub lines: Vec<InvoiceLine>,
}

fn uppercase(_src: &FieldType, _dst: &FieldType, value: AnyValue) -> Result<AnyValue, BoxError> {
    let s: String = value.downcast()?;
    Ok(AnyValue::new(s.to_uppercase()))
}

fn print_json<T: Serialize>(label: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{label}:\n{json}"),
        Err(e) => tracing::error!(error = %e, "failed to serialize result"),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            tracing::info!(config = %path, "loading configuration");
            match Config::load(path) {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!(error = %e, "failed to load config");
                    std::process::exit(1);
                }
            }
        }
        None => Config {
            auto_string_to_number: true,
            auto_number_to_string: true,
            ..Config::default()
        },
    };
    tracing::info!(?config, "building mapper");

    let mapper = Mapper::builder()
        .config(config)
        .callback(Callback::new("uppercase", uppercase))
        .build();

    let person = Person {
        name: "ada".to_string(),
        phone_number: "5551234567".to_string(),
        age: 36,
        height_cm: 170.5,
        tags: vec!["math".to_string(), "engines".to_string()],
    };
    match mapper.map_to::<_, User>(&person) {
        Ok(user) => print_json("user", &user),
        Err(e) => tracing::error!(error = %e, "person -> user failed"),
    }

    let order = Order {
        id: 1042,
        customer: "Analytical Engines Ltd".to_string(),
        items: vec![
            LineItem {
                sku: "CARD-PUNCH".to_string(),
                quantity: 3,
                unit_price: 12.5,
            },
            LineItem {
                sku: "MILL-GEAR".to_string(),
                quantity: 40,
                unit_price: 0.75,
            },
        ],
    };
    match mapper.map_to::<_, Invoice>(&order) {
        Ok(invoice) => print_json("invoice", &invoice),
        Err(e) => tracing::error!(error = %e, "order -> invoice failed"),
    }

    // Same order, one line with zero quantity: the `gt=0` validator rejects it.
    let mut bad = order;
    bad.items[1].quantity = 0;
    match mapper.map_to::<_, Invoice>(&bad) {
        Ok(invoice) => print_json("invoice", &invoice),
        Err(e) => tracing::warn!(error = %e, fault = e.is_fault(), "order rejected"),
    }
}
