use std::sync::Arc;

use crate::server;
use crate::services::{source_client, Source};

pub async fn run(port: u16, source: String) {
    let source: Source = match source.parse() {
        Ok(source) => source,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    println!("🚀 Starting vnquote server on port {}", port);
    println!("📈 Data source: {}", source.name());

    let client = match source_client(source) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Failed to build {} client: {}", source.name(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::serve(Arc::from(client), port).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}
