#![allow(missing_docs)]

#[tokio::main]
async fn main() {
    if let Err(e) = ufcstats_harvester::run().await {
        eprintln!("❌ {e:#}");
        std::process::exit(1);
    }
}
