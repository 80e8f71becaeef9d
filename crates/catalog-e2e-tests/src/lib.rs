use anyhow::{anyhow, Result};
use catalog_dal::{
    book::{Book, BookRepository, CreateBook},
    genre::{Genre, GenreRepository},
};
use catalog_server::config::{Parser, ServerConfig};
use rand::Rng as _;
use reqwest::{StatusCode, Url};
use tempfile::TempDir;
use tracing::info;

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, std::time::Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn test_config(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix(format!("{}_", test_name))?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?.to_string();
    let base_url = format!("http://localhost:{}", port);
    let args = &[
        "catalog-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
        "--base-url",
        &base_url,
    ];
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

pub async fn prepare_env(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    let (args, config_guard) = test_config(test_name)?;
    tokio::fs::create_dir_all(args.data_dir()).await?;
    Ok((args, config_guard))
}

/// Starts the server in background and waits until it answers health checks.
pub async fn spawn_server(args: ServerConfig) -> Result<()> {
    let health_url = args.base_url.join("health")?;
    tokio::spawn(async move {
        if let Err(e) = catalog_server::run::run(args).await {
            tracing::error!("Server failed: {e}");
        }
    });

    let client = reqwest::Client::new();
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        match client.get(health_url.clone()).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Server is up");
                return Ok(());
            }
            _ => continue,
        }
    }
    Err(anyhow!("Server did not start"))
}

/// Client which reports redirects instead of following them.
pub fn test_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    Ok(client)
}

pub async fn launch_env(args: ServerConfig) -> Result<(reqwest::Client, Store)> {
    let database_url = args.database_url();
    spawn_server(args).await?;
    let store = Store::connect(&database_url).await?;
    Ok((test_client()?, store))
}

pub fn extend_url(url: &Url, segment: impl ToString) -> Url {
    let mut url = url.clone();
    url.path_segments_mut().unwrap().push(&segment.to_string());
    url
}

/// Direct access to the server database, for seeding and checking results.
pub struct Store {
    pub genres: GenreRepository,
    pub books: BookRepository,
}

impl Store {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = catalog_dal::new_pool(database_url).await?;
        Ok(Store {
            genres: GenreRepository::new(pool.clone()),
            books: BookRepository::new(pool),
        })
    }

    pub async fn add_book(&self, title: &str, genre: &Genre) -> Result<Book> {
        let book = self
            .books
            .create(CreateBook {
                title: title.to_string(),
                summary: format!("Summary of {title}"),
                isbn: "9780000000000".to_string(),
                genre_id: Some(genre.id),
            })
            .await?;
        Ok(book)
    }
}

/// Posts the genre form, returns status and `Location` header if any.
pub async fn submit_genre(
    client: &reqwest::Client,
    base_url: &Url,
    name: &str,
) -> Result<(StatusCode, Option<String>, String)> {
    let url = base_url.join("catalog/genre/create")?;
    let response = client.post(url).form(&[("name", name)]).send().await?;
    let status = response.status();
    let location = response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|l| l.to_str().ok())
        .map(|l| l.to_string());
    let body = response.text().await?;
    Ok((status, location, body))
}
