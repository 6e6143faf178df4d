use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(error) = coaching_core::run().await {
        error!("coaching-core exited with error: {}", error);
        std::process::exit(1);
    }
}
