use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Url, RequestBuilder, Response};
use reqwest_cookie_store::{CookieStore, CookieStoreRwLock};
use serde::de::DeserializeOwned;

pub mod error;
pub mod cohorts;

use error::{ApiClientError, RequestError};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Info {
    pub url: Url
}

pub struct ApiClient {
    pub(crate) cookie_file: Option<Box<Path>>,
    pub(crate) store: Arc<CookieStoreRwLock>,
    pub(crate) client: reqwest::Client,
    pub(crate) info: Info
}

impl ApiClient {
    pub fn builder(url: Url) -> ApiClientBuilder {
        ApiClientBuilder {
            url,
            file: None,
            agent: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub(crate) fn get<U>(&self, path: U) -> Result<RequestBuilder, RequestError>
    where
        U: AsRef<str>,
    {
        let url = self.info.url.join(path.as_ref())?;

        Ok(self.client.get(url))
    }

    /// decodes a successful response as json. error responses are decoded as
    /// an [`ApiError`](crate::ApiError) when possible.
    pub(crate) async fn read_json<T>(res: Response) -> Result<T, RequestError>
    where
        T: DeserializeOwned
    {
        let status = res.status();

        if status.is_success() {
            return Ok(res.json().await?);
        }

        tracing::debug!("server responded with {status}");

        match res.json().await {
            Ok(err) => Err(RequestError::Api(err)),
            Err(_) => Err(RequestError::Status(status))
        }
    }

    /// writes the current cookies to the cookie file if one was given
    pub fn save_session(&self) -> Result<bool, ApiClientError> {
        let Some(cookie_file) = &self.cookie_file else {
            return Ok(false);
        };

        let store = self.store.read()
            .map_err(|_e| ApiClientError::PoisonedLock)?;
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(cookie_file)
            .map_err(ApiClientError::StdIo)?;
        let mut writer = std::io::BufWriter::new(file);

        store.save_json(&mut writer)
            .map_err(ApiClientError::CookieStore)?;

        Ok(true)
    }
}

pub struct ApiClientBuilder {
    url: Url,
    file: Option<PathBuf>,
    agent: Option<String>,
    timeout: Duration,
}

impl ApiClientBuilder {
    pub fn secure(&mut self, is_secure: bool) -> bool {
        if is_secure {
            self.url.set_scheme("https").is_ok()
        } else {
            self.url.set_scheme("http").is_ok()
        }
    }

    pub fn host<H>(&mut self, host: H) -> bool
    where
        H: AsRef<str>
    {
        self.url.set_host(Some(host.as_ref())).is_ok()
    }

    pub fn port(&mut self, port: Option<u16>) -> bool {
        self.url.set_port(port).is_ok()
    }

    pub fn cookie_file(&mut self, path: PathBuf) {
        self.file = Some(path);
    }

    pub fn user_agent<U>(&mut self, user_agent: U)
    where
        U: Into<String>
    {
        self.agent = Some(user_agent.into());
    }

    pub fn timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn build(self) -> Result<ApiClient, ApiClientError> {
        let user_agent = self.agent.unwrap_or("cohort-api-client/0.1.0".into());
        let store = if let Some(path) = &self.file {
            match std::fs::OpenOptions::new()
                .read(true)
                .open(path) {
                Ok(file) => {
                    let reader = std::io::BufReader::new(file);

                    CookieStore::load_json(reader)
                        .map_err(ApiClientError::CookieStore)?
                },
                // created on the first save
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => CookieStore::default(),
                Err(err) => return Err(ApiClientError::StdIo(err)),
            }
        } else {
            CookieStore::default()
        };

        let store = Arc::new(CookieStoreRwLock::new(store));
        let client = reqwest::Client::builder()
            .cookie_provider(store.clone())
            .user_agent(user_agent)
            .timeout(self.timeout)
            .build()
            .map_err(ApiClientError::Reqwest)?;

        tracing::debug!("api client for {}", self.url);

        Ok(ApiClient {
            cookie_file: self.file.map(|v| v.into_boxed_path()),
            store,
            client,
            info: Info {
                url: self.url
            }
        })
    }
}

impl TryFrom<&str> for ApiClientBuilder {
    type Error = ApiClientError;

    fn try_from(url: &str) -> Result<Self, Self::Error> {
        let url = Url::parse(url).map_err(ApiClientError::InvalidUrl)?;

        Ok(ApiClient::builder(url))
    }
}
