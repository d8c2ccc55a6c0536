//! Filter cache walkthrough against a local JSON preference file
//!
//! ```sh
//! RUST_LOG=process_filters=debug cargo run --example filters_demo
//! ```

use process_filters::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::temp_dir().join("process-filters-demo.json");
    let config = FilterServiceConfig {
        store: StoreConfig::File { path: path.clone() },
        ..Default::default()
    };
    let alice = FilterCacheService::from_config(config, Arc::new(StaticIdentity::new("alice")))?;

    println!("📁 Preferences stored in {}\n", path.display());

    // Background load; the first item is the loaded set
    let mut stream = alice.get_filters("billing");
    if let Some(filters) = stream.next().await {
        for filter in filters? {
            println!("  {:<22} status={:<10} id={}", filter.key, filter.status, filter.id);
        }
    }

    let mine = FilterDefinition::new("suspended", "Suspended processes", "billing")
        .with_icon("pause")
        .with_sort("startDate")
        .with_status("SUSPENDED")
        .with_order("DESC");
    let filters = alice.add_filter(mine).await?;
    println!("\n✅ Added filter, {} in set", filters.len());

    if let Some(Ok(latest)) = stream.next().await {
        println!("📡 Stream now holds {} filters", latest.len());
    }

    let bob = alice.with_identity(Arc::new(StaticIdentity::new("bob")));
    let bobs = bob.load_filters("billing").await?;
    println!("👤 bob sees {} filters under {}", bobs.len(), bob.preference_key("billing"));

    Ok(())
}
