//! latency-probe CLI entry point.

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = latency_probe_cli::run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
