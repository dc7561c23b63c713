use coin_compare_sdk::{presentation, Currency, EngineConfig, MarketEngine};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let engine = MarketEngine::new(EngineConfig::from_env())?;

    // Print every engine transition as it happens
    let mut events = engine.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!("  [event] {}", event);
        }
    });

    println!("Market cap comparison ({})", engine.source_name());
    println!("==================================");

    let outcome = engine.start().outcome().await;
    println!("Initial fetch: {:?}", outcome);
    print_view(&engine);

    if let Some(third) = engine.records().get(2).map(|r| r.name.clone()) {
        println!("\nComparing {} instead of the default slot B...", third);
        engine.select_entity_b(&third)?;
        print_view(&engine);
    }

    let current = engine.query().currency;
    for currency in Currency::all().iter().filter(|c| **c != current) {
        println!("\nSwitching to {}...", currency.code().to_uppercase());
        engine.set_currency(*currency).outcome().await;
        print_view(&engine);
    }

    let metrics = engine.fetch_metrics().await;
    println!(
        "\nFetches: {} (failed {}), p50={:.0}ms",
        metrics.total_fetches, metrics.failed_fetches, metrics.latency_p50_ms
    );

    Ok(())
}

fn print_view(engine: &MarketEngine) {
    let currency = engine.query().currency;
    println!("{:-<50}", "");
    for record in engine.records() {
        println!(
            "{:<20} {:>20} {:>20.0}",
            record.name,
            presentation::format_price(&record, currency),
            record.circulating_supply
        );
    }

    let metrics = engine.derived_metrics();
    println!("{}", presentation::comparison_headline(&engine.selection(), &metrics));
    println!("{}", presentation::format_ratio(&metrics));
    println!(
        "A at B's cap: {}",
        presentation::format_amount(
            metrics.as_ref().map(|m| m.entity_a_value_at_entity_b_cap),
            currency
        )
    );
    println!(
        "A's cap at B's price: {}",
        presentation::format_amount(
            metrics.as_ref().map(|m| m.entity_a_cap_at_entity_b_price),
            currency
        )
    );
}
