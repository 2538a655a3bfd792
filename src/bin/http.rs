#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use workhour_allocator::{
        CalendarConfig, http_api,
        logging::{LogFormat, init_logging},
        persistence::load_calendar_config_from_json,
    };

    let _ = init_logging("info", LogFormat::from_env());

    let addr: SocketAddr = std::env::var("WORKHOUR_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let config = match std::env::var("WORKHOUR_CALENDAR") {
        Ok(path) => load_calendar_config_from_json(path)?,
        Err(_) => CalendarConfig::default(),
    };

    println!("workhour-allocator HTTP API listening on http://{addr}");
    http_api::serve(addr, config).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
