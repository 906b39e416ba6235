//! Run a few cursors against the in-memory engine and print the results.
//!
//! Set `RUST_LOG=debug` to watch sessions open and close.
use loris_core::{DataType, Entity, Restrictions};
use loris_debug::{MemoryEngine, MemoryTable};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Person {
    id: String,
    name: String,
    country: String,
}

impl Entity for Person {
    const SOURCE: &'static str = "person";
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let engine = MemoryEngine::with_tables([
        MemoryTable::new("person")
            .column("id", DataType::Utf8)
            .column("name", DataType::Utf8)
            .column("country", DataType::Utf8)
            .row(["p1", "Ann", "US"])
            .row(["p2", "Bo", "BR"])
            .row(["p3", "Cal", "US"]),
        MemoryTable::new("address")
            .column("id", DataType::Utf8)
            .column("city", DataType::Utf8)
            .row(["p1", "Austin"])
            .row(["p2", "Recife"]),
    ]);
    let store = engine.datastore();

    let people = store.cursor::<Person>().await?;
    println!("everyone:");
    for person in people.collect().await? {
        println!("  {person:?}");
    }

    println!("names in the US:");
    let names = people
        .filter(Restrictions::new().eq("country", "US"))
        .select(["name"])
        .collect_rows()
        .await?;
    for row in names {
        println!("  {row}");
    }

    println!("people with their cities:");
    let addresses = store.source_cursor("address").await?;
    for row in people.join(&addresses).collect_rows().await? {
        println!("  {row}");
    }

    println!("first person: {:?}", people.first().await?);
    println!(
        "sessions opened={} closed={}",
        engine.sessions_opened(),
        engine.sessions_closed(),
    );

    Ok(())
}
