use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::{AppError, RetrievalError};
use crate::jsonp::CallbackScript;
use crate::models::{DataSource, Game};
use crate::sample::sample_games;

pub const DEFAULT_API_URL: &str = "https://www.freetogame.com/api/games";
pub const DEFAULT_RELAY_PATH_BASE: &str = "https://cors-anywhere.herokuapp.com/";
pub const DEFAULT_RELAY_QUERY_BASE: &str = "https://api.allorigins.win/raw";

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub api_url: Url,
    /// Relay that takes the target appended to its path.
    pub relay_path_base: String,
    /// Relay that takes the target as the `url` query parameter.
    pub relay_query_base: Url,
    pub callback_timeout: Duration,
    pub sample_delay: Duration,
}

impl CatalogConfig {
    pub fn with_defaults() -> Result<Self, AppError> {
        Ok(Self {
            api_url: parse_url(DEFAULT_API_URL)?,
            relay_path_base: DEFAULT_RELAY_PATH_BASE.to_string(),
            relay_query_base: parse_url(DEFAULT_RELAY_QUERY_BASE)?,
            callback_timeout: Duration::from_secs(10),
            sample_delay: Duration::from_millis(500),
        })
    }
}

fn parse_url(raw: &str) -> Result<Url, AppError> {
    Url::parse(raw).map_err(|e| AppError::Internal(format!("url '{raw}': {e}")))
}

/// One way of getting the game list.
#[async_trait]
pub trait RetrievalStrategy: Send + Sync {
    fn kind(&self) -> DataSource;
    async fn attempt(&self) -> Result<Vec<Game>, RetrievalError>;
}

/// Plain JSON GET, used for the direct call and both relays.
pub struct HttpStrategy {
    kind: DataSource,
    client: Client,
    url: Url,
}

impl HttpStrategy {
    pub fn direct(client: Client, api_url: &Url) -> Self {
        Self {
            kind: DataSource::Direct,
            client,
            url: api_url.clone(),
        }
    }

    pub fn relay_path(client: Client, base: &str, api_url: &Url) -> Result<Self, AppError> {
        let url = Url::parse(&format!("{base}{api_url}"))
            .map_err(|e| AppError::InvalidArgument(format!("relay path url: {e}")))?;
        Ok(Self {
            kind: DataSource::RelayPath,
            client,
            url,
        })
    }

    pub fn relay_query(client: Client, base: &Url, api_url: &Url) -> Self {
        let mut url = base.clone();
        url.query_pairs_mut().append_pair("url", api_url.as_str());
        Self {
            kind: DataSource::RelayQuery,
            client,
            url,
        }
    }

    #[cfg(test)]
    fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl RetrievalStrategy for HttpStrategy {
    fn kind(&self) -> DataSource {
        self.kind
    }

    async fn attempt(&self) -> Result<Vec<Game>, RetrievalError> {
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Transport(format!(
                "{:?} returned {status}",
                self.kind
            )));
        }
        Ok(response.json::<Vec<Game>>().await?)
    }
}

/// Last resort: the compiled-in sample after a short simulated latency.
pub struct StaticSample {
    delay: Duration,
}

impl StaticSample {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl RetrievalStrategy for StaticSample {
    fn kind(&self) -> DataSource {
        DataSource::StaticSample
    }

    async fn attempt(&self) -> Result<Vec<Game>, RetrievalError> {
        tokio::time::sleep(self.delay).await;
        tracing::warn!("using sample data fallback, catalog is not live");
        Ok(sample_games())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retrieval {
    pub games: Vec<Game>,
    pub source: Option<DataSource>,
}

pub struct FetchChain {
    strategies: Vec<Box<dyn RetrievalStrategy>>,
}

impl FetchChain {
    pub fn new(strategies: Vec<Box<dyn RetrievalStrategy>>) -> Self {
        Self { strategies }
    }

    /// Direct call, both relays, callback script, then the static sample.
    pub fn standard(config: &CatalogConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(concat!("f2p-catalog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let strategies: Vec<Box<dyn RetrievalStrategy>> = vec![
            Box::new(HttpStrategy::direct(client.clone(), &config.api_url)),
            Box::new(HttpStrategy::relay_path(
                client.clone(),
                &config.relay_path_base,
                &config.api_url,
            )?),
            Box::new(HttpStrategy::relay_query(
                client.clone(),
                &config.relay_query_base,
                &config.api_url,
            )),
            Box::new(CallbackScript::over_http(
                client,
                config.api_url.clone(),
                config.callback_timeout,
            )),
            Box::new(StaticSample::new(config.sample_delay)),
        ];
        Ok(Self::new(strategies))
    }

    pub async fn retrieve(&self) -> Vec<Game> {
        self.retrieve_with_source().await.games
    }

    pub async fn retrieve_with_source(&self) -> Retrieval {
        for strategy in &self.strategies {
            let kind = strategy.kind();
            let outcome = match strategy.attempt().await {
                Ok(games) if games.is_empty() => Err(RetrievalError::EmptyResult),
                other => other,
            };

            match outcome {
                Ok(games) => {
                    tracing::info!(source = ?kind, count = games.len(), "games retrieved");
                    return Retrieval {
                        games,
                        source: Some(kind),
                    };
                }
                Err(err) => {
                    tracing::info!(source = ?kind, error = %err, "retrieval strategy failed");
                }
            }
        }

        tracing::error!("all game retrieval strategies failed");
        Retrieval {
            games: Vec::new(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    enum Script {
        Games(Vec<Game>),
        Empty,
        Fail,
    }

    struct Counted {
        kind: DataSource,
        calls: Arc<AtomicUsize>,
        script: Script,
    }

    #[async_trait]
    impl RetrievalStrategy for Counted {
        fn kind(&self) -> DataSource {
            self.kind
        }

        async fn attempt(&self) -> Result<Vec<Game>, RetrievalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                Script::Games(games) => Ok(games.clone()),
                Script::Empty => Ok(Vec::new()),
                Script::Fail => Err(RetrievalError::Transport("boom".to_string())),
            }
        }
    }

    fn counted(kind: DataSource, script: Script) -> (Box<dyn RetrievalStrategy>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let strategy: Box<dyn RetrievalStrategy> = Box::new(Counted {
            kind,
            calls: Arc::clone(&calls),
            script,
        });
        (strategy, calls)
    }

    fn one_game(id: i64) -> Vec<Game> {
        let mut games = sample_games();
        games.truncate(1);
        games[0].id = id;
        games
    }

    #[tokio::test]
    async fn first_non_empty_result_wins_and_stops_the_chain() {
        let (failing, failing_calls) = counted(DataSource::Direct, Script::Fail);
        let (empty, empty_calls) = counted(DataSource::RelayPath, Script::Empty);
        let (good, good_calls) = counted(DataSource::RelayQuery, Script::Games(one_game(42)));
        let (later, later_calls) = counted(DataSource::CallbackScript, Script::Games(one_game(7)));

        let chain = FetchChain::new(vec![failing, empty, good, later]);
        let retrieval = chain.retrieve_with_source().await;

        assert_eq!(retrieval.source, Some(DataSource::RelayQuery));
        assert_eq!(retrieval.games[0].id, 42);
        assert_eq!(failing_calls.load(Ordering::SeqCst), 1);
        assert_eq!(empty_calls.load(Ordering::SeqCst), 1);
        assert_eq!(good_calls.load(Ordering::SeqCst), 1);
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn first_strategy_success_skips_everything_else() {
        let (good, good_calls) = counted(DataSource::Direct, Script::Games(one_game(1)));
        let (rest, rest_calls) = counted(DataSource::RelayPath, Script::Games(one_game(2)));

        let games = FetchChain::new(vec![good, rest]).retrieve().await;

        assert_eq!(games.len(), 1);
        assert_eq!(good_calls.load(Ordering::SeqCst), 1);
        assert_eq!(rest_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn network_failures_fall_through_to_the_sample() {
        let (a, _) = counted(DataSource::Direct, Script::Fail);
        let (b, _) = counted(DataSource::RelayPath, Script::Fail);
        let (c, _) = counted(DataSource::RelayQuery, Script::Empty);
        let (d, _) = counted(DataSource::CallbackScript, Script::Fail);
        let sample: Box<dyn RetrievalStrategy> =
            Box::new(StaticSample::new(Duration::from_millis(500)));

        let retrieval = FetchChain::new(vec![a, b, c, d, sample])
            .retrieve_with_source()
            .await;

        assert_eq!(retrieval.source, Some(DataSource::StaticSample));
        assert_eq!(retrieval.games, sample_games());
        assert_eq!(retrieval.games.len(), 8);
    }

    #[tokio::test]
    async fn exhausted_chain_yields_empty_list() {
        let (a, _) = counted(DataSource::Direct, Script::Fail);
        let (b, _) = counted(DataSource::RelayPath, Script::Empty);

        let retrieval = FetchChain::new(vec![a, b]).retrieve_with_source().await;

        assert!(retrieval.games.is_empty());
        assert_eq!(retrieval.source, None);
    }

    fn games_body() -> serde_json::Value {
        serde_json::json!([{
            "id": 540,
            "title": "Overwatch 2",
            "thumbnail": "https://www.freetogame.com/g/540/thumbnail.jpg",
            "short_description": "A hero-focused first-person team shooter.",
            "game_url": "https://www.freetogame.com/open/overwatch-2",
            "genre": "Shooter",
            "platform": "PC (Windows)",
            "publisher": "Activision Blizzard",
            "developer": "Blizzard Entertainment",
            "release_date": "2022-10-04",
            "freetogame_profile_url": "https://www.freetogame.com/overwatch-2"
        }])
    }

    #[tokio::test]
    async fn direct_strategy_decodes_games() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/games"))
            .respond_with(ResponseTemplate::new(200).set_body_json(games_body()))
            .mount(&server)
            .await;

        let api = Url::parse(&format!("{}/api/games", server.uri())).unwrap();
        let games = HttpStrategy::direct(Client::new(), &api)
            .attempt()
            .await
            .unwrap();

        assert_eq!(games.len(), 1);
        assert_eq!(games[0].title, "Overwatch 2");
        assert_eq!(games[0].genre, "Shooter");
    }

    #[tokio::test]
    async fn non_success_status_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let api = Url::parse(&format!("{}/api/games", server.uri())).unwrap();
        let err = HttpStrategy::direct(Client::new(), &api)
            .attempt()
            .await
            .unwrap_err();

        assert!(matches!(err, RetrievalError::Transport(_)), "{err}");
    }

    #[tokio::test]
    async fn garbage_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let api = Url::parse(&format!("{}/api/games", server.uri())).unwrap();
        let err = HttpStrategy::direct(Client::new(), &api)
            .attempt()
            .await
            .unwrap_err();

        assert!(matches!(err, RetrievalError::Decode(_)), "{err}");
    }

    #[tokio::test]
    async fn query_relay_passes_target_as_parameter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/raw"))
            .and(query_param("url", DEFAULT_API_URL))
            .respond_with(ResponseTemplate::new(200).set_body_json(games_body()))
            .mount(&server)
            .await;

        let base = Url::parse(&format!("{}/raw", server.uri())).unwrap();
        let api = Url::parse(DEFAULT_API_URL).unwrap();
        let strategy = HttpStrategy::relay_query(Client::new(), &base, &api);

        assert!(
            strategy
                .url()
                .as_str()
                .ends_with("/raw?url=https%3A%2F%2Fwww.freetogame.com%2Fapi%2Fgames")
        );
        let games = strategy.attempt().await.unwrap();
        assert_eq!(games[0].id, 540);
    }

    #[test]
    fn path_relay_appends_target() {
        let api = Url::parse(DEFAULT_API_URL).unwrap();
        let strategy =
            HttpStrategy::relay_path(Client::new(), DEFAULT_RELAY_PATH_BASE, &api).unwrap();

        assert_eq!(
            strategy.url().as_str(),
            "https://cors-anywhere.herokuapp.com/https://www.freetogame.com/api/games"
        );
        assert_eq!(strategy.kind(), DataSource::RelayPath);
    }

    #[tokio::test]
    async fn standard_chain_prefers_the_live_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/games"))
            .respond_with(ResponseTemplate::new(200).set_body_json(games_body()))
            .expect(1)
            .mount(&server)
            .await;

        let config = CatalogConfig {
            api_url: Url::parse(&format!("{}/api/games", server.uri())).unwrap(),
            ..CatalogConfig::with_defaults().unwrap()
        };
        let retrieval = FetchChain::standard(&config)
            .unwrap()
            .retrieve_with_source()
            .await;

        assert_eq!(retrieval.source, Some(DataSource::Direct));
        assert_eq!(retrieval.games.len(), 1);
    }
}
