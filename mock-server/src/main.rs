use mock_server::ServerCredentials;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8081".to_string());
    let credentials = ServerCredentials {
        license_id: std::env::var("ANYDESK_LICENSE_ID").unwrap_or_else(|_| "1438129266231705".to_string()),
        api_password: std::env::var("ANYDESK_API_PASSWORD").unwrap_or_else(|_| "UYETICGU2CT3KES".to_string()),
    };

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, license = %credentials.license_id, "mock AnyDesk API listening");
    mock_server::run(listener, mock_server::app(credentials)).await
}
