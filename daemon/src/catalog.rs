/// Discord detectable-games catalog: record types, the remote provider, and
/// the built-in sample list used when the remote fetch fails.
///
/// The catalog is read-only once loaded. Everything downstream (search, the
/// selection state machine) borrows or clones records from it.
use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::config::CatalogConfig;

/// Shown in the executables list when a catalog entry omits its `os`.
pub const DEFAULT_EXECUTABLE_OS: &str = "win32";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executable {
    pub name: String,
    #[serde(default)]
    pub os: Option<String>,
}

impl Executable {
    pub fn new(name: &str, os: &str) -> Self {
        Self {
            name: name.to_string(),
            os: Some(os.to_string()),
        }
    }

    /// Target OS label, falling back to [`DEFAULT_EXECUTABLE_OS`].
    pub fn os(&self) -> &str {
        self.os.as_deref().unwrap_or(DEFAULT_EXECUTABLE_OS)
    }
}

/// One entry of the detectable-applications catalog.
///
/// Unknown fields in the upstream JSON (`third_party_skus`, `hook`, …) are
/// ignored. List fields tolerate both absence and `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub publishers: Vec<Publisher>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub executables: Vec<Executable>,
    /// Alternative names. Duplicates are dropped on load; first occurrence wins.
    #[serde(default, deserialize_with = "alias_set")]
    pub aliases: Vec<String>,
}

impl GameRecord {
    pub fn primary_publisher(&self) -> Option<&Publisher> {
        self.publishers.first()
    }

    pub fn executable(&self, name: &str) -> Option<&Executable> {
        self.executables.iter().find(|e| e.name == name)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn alias_set<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<String> = null_as_empty(deserializer)?;
    let mut aliases: Vec<String> = Vec::with_capacity(raw.len());
    for alias in raw {
        if !aliases.contains(&alias) {
            aliases.push(alias);
        }
    }
    Ok(aliases)
}

/// Where the loaded catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub games: Vec<GameRecord>,
    pub source: CatalogSource,
}

impl LoadedCatalog {
    pub fn fallback() -> Self {
        Self {
            games: sample_games(),
            source: CatalogSource::Fallback,
        }
    }
}

/// Anything that can produce the full catalog in one call.
pub trait CatalogProvider {
    fn fetch(&self) -> impl Future<Output = Result<Vec<GameRecord>>> + Send;
}

/// Fetches the catalog as a JSON array from a single HTTP endpoint.
pub struct HttpCatalog {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalog {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("quest-sim-daemon/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

impl CatalogProvider for HttpCatalog {
    fn fetch(&self) -> impl Future<Output = Result<Vec<GameRecord>>> + Send {
        async move {
            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .with_context(|| format!("Failed to reach {}", self.url))?
                .error_for_status()
                .context("Catalog endpoint returned an error status")?;
            response
                .json::<Vec<GameRecord>>()
                .await
                .context("Failed to decode catalog JSON")
        }
    }
}

/// Fetches from `provider`, substituting [`sample_games`] on any failure.
pub async fn load<P: CatalogProvider>(provider: &P) -> LoadedCatalog {
    match provider.fetch().await {
        Ok(games) => {
            info!("[catalog] Loaded {} detectable games", games.len());
            LoadedCatalog {
                games,
                source: CatalogSource::Remote,
            }
        }
        Err(e) => {
            warn!("[catalog] Fetch failed, using sample games: {e:#}");
            LoadedCatalog::fallback()
        }
    }
}

fn record(
    id: &str,
    name: &str,
    publisher: (&str, &str),
    executables: &[&str],
    aliases: &[&str],
) -> GameRecord {
    GameRecord {
        id: id.to_string(),
        name: name.to_string(),
        publishers: vec![Publisher {
            id: publisher.0.to_string(),
            name: publisher.1.to_string(),
        }],
        executables: executables
            .iter()
            .map(|exe| Executable::new(exe, DEFAULT_EXECUTABLE_OS))
            .collect(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
    }
}

/// The five built-in records used when the remote catalog is unavailable.
pub fn sample_games() -> Vec<GameRecord> {
    const RIOT: (&str, &str) = ("356875221078245376", "Riot Games");
    vec![
        record(
            "356875570916753438",
            "VALORANT",
            RIOT,
            &["VALORANT-Win64-Shipping.exe", "VALORANT.exe"],
            &["Valorant", "VAL"],
        ),
        record(
            "356876590342242305",
            "League of Legends",
            RIOT,
            &["League of Legends.exe", "LeagueClient.exe"],
            &["LoL", "League"],
        ),
        record(
            "356877880938070016",
            "Minecraft",
            ("356877297458847744", "Mojang"),
            &["Minecraft.Windows.exe", "javaw.exe"],
            &["MC"],
        ),
        record(
            "438122941302046720",
            "Fortnite",
            ("438122941302046721", "Epic Games"),
            &["FortniteClient-Win64-Shipping.exe"],
            &["FN"],
        ),
        record(
            "356943499456937984",
            "Apex Legends",
            ("356943383846608898", "Electronic Arts"),
            &["r5apex.exe"],
            &["Apex"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticProvider(Vec<GameRecord>);

    impl CatalogProvider for StaticProvider {
        fn fetch(&self) -> impl Future<Output = Result<Vec<GameRecord>>> + Send {
            let games = self.0.clone();
            async move { Ok(games) }
        }
    }

    struct OfflineProvider;

    impl CatalogProvider for OfflineProvider {
        fn fetch(&self) -> impl Future<Output = Result<Vec<GameRecord>>> + Send {
            async { Err::<Vec<GameRecord>, _>(anyhow::anyhow!("network unreachable")) }
        }
    }

    // ── sample data ───────────────────────────────────────────────────────────

    #[test]
    fn sample_games_has_five_unique_entries() {
        let games = sample_games();
        assert_eq!(games.len(), 5);
        let mut ids: Vec<&str> = games.iter().map(|g| g.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn sample_games_all_have_executables_and_publisher() {
        for game in sample_games() {
            assert!(!game.executables.is_empty(), "{} has no executables", game.name);
            assert!(game.primary_publisher().is_some());
        }
    }

    // ── deserialization ───────────────────────────────────────────────────────

    #[test]
    fn deserializes_upstream_shape_and_ignores_unknown_fields() {
        let json = r#"[{
            "id": "1",
            "name": "Test Game",
            "publishers": [{"id": "9", "name": "Studio"}],
            "executables": [{"name": "game.exe", "os": "win32", "is_launcher": false}],
            "third_party_skus": [],
            "aliases": ["TG"],
            "hook": true
        }]"#;
        let games: Vec<GameRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].primary_publisher().unwrap().name, "Studio");
        assert_eq!(games[0].executables[0].os(), "win32");
        assert_eq!(games[0].aliases, vec!["TG".to_string()]);
    }

    #[test]
    fn missing_and_null_lists_default_to_empty() {
        let json = r#"[
            {"id": "1", "name": "Bare"},
            {"id": "2", "name": "Nulls", "publishers": null, "executables": null, "aliases": null}
        ]"#;
        let games: Vec<GameRecord> = serde_json::from_str(json).unwrap();
        for game in &games {
            assert!(game.publishers.is_empty());
            assert!(game.executables.is_empty());
            assert!(game.aliases.is_empty());
        }
    }

    #[test]
    fn missing_os_falls_back_to_win32() {
        let exe: Executable = serde_json::from_str(r#"{"name": "a.exe"}"#).unwrap();
        assert_eq!(exe.os(), DEFAULT_EXECUTABLE_OS);
    }

    #[test]
    fn duplicate_aliases_are_dropped_in_order() {
        let json = r#"{"id": "1", "name": "G", "aliases": ["b", "a", "b"]}"#;
        let game: GameRecord = serde_json::from_str(json).unwrap();
        assert_eq!(game.aliases, vec!["b".to_string(), "a".to_string()]);
    }

    // ── load ──────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn load_uses_provider_result_on_success() {
        let provider = StaticProvider(vec![record("7", "Solo", ("1", "P"), &["s.exe"], &[])]);
        let loaded = load(&provider).await;
        assert_eq!(loaded.source, CatalogSource::Remote);
        assert_eq!(loaded.games.len(), 1);
        assert_eq!(loaded.games[0].name, "Solo");
    }

    #[tokio::test]
    async fn load_falls_back_to_samples_on_failure() {
        let loaded = load(&OfflineProvider).await;
        assert_eq!(loaded.source, CatalogSource::Fallback);
        assert_eq!(loaded.games, sample_games());
    }

    #[tokio::test]
    async fn http_catalog_with_unreachable_url_falls_back() {
        let config = CatalogConfig {
            url: "http://127.0.0.1:9/api/applications/detectable".to_string(),
            timeout_secs: 1,
        };
        let provider = HttpCatalog::new(&config).unwrap();
        let loaded = load(&provider).await;
        assert_eq!(loaded.source, CatalogSource::Fallback);
    }
}
