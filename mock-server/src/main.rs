use tokio::net::TcpListener;

use mock_server::{app_with, Catalog};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let mut catalog = Catalog::sample();
    if let Ok(key) = std::env::var("CANLII_API_KEY") {
        catalog.api_key = key;
    }

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("mock CanLII API on http://{addr} (api_key={})", catalog.api_key);
    axum::serve(listener, app_with(catalog)).await
}
