use crate::domain::constants::{AUR_REPO, NO_DESCRIPTION};
use crate::domain::models::{HitSource, SearchHit};
use crate::services::config::SearchConfig;
use crate::services::search::install_command;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Deserialize)]
struct OfficialResponse {
    #[serde(default)]
    results: Vec<OfficialPkg>,
}

#[derive(Deserialize)]
struct OfficialPkg {
    #[serde(default)]
    pkgname: String,
    repo: Option<String>,
    pkgdesc: Option<String>,
}

#[derive(Deserialize)]
struct AurResponse {
    #[serde(default)]
    results: Vec<AurPkg>,
}

#[derive(Deserialize)]
struct AurPkg {
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Description")]
    description: Option<String>,
}

#[derive(Debug, Default)]
pub struct OnlineHits {
    pub official: Vec<SearchHit>,
    pub aur: Vec<SearchHit>,
}

impl OnlineHits {
    pub fn into_vec(self) -> Vec<SearchHit> {
        let mut out = self.official;
        out.extend(self.aur);
        out
    }
}

fn online_hit(name: String, repo: String, desc: Option<String>) -> SearchHit {
    SearchHit {
        install_command: install_command(&name, &repo),
        name,
        repo,
        desc: desc.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        source: HitSource::Online,
        icon: None,
    }
}

fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    params: &[(&str, &str)],
) -> anyhow::Result<T> {
    let resp = client.get(url).query(params).send()?;
    if resp.status() != StatusCode::OK {
        anyhow::bail!("{} answered {}", url, resp.status());
    }
    Ok(resp.json()?)
}

pub fn search_official(
    client: &Client,
    cfg: &SearchConfig,
    query: &str,
) -> anyhow::Result<Vec<SearchHit>> {
    let body: OfficialResponse = fetch_json(client, &cfg.official_url, &[("q", query)])?;
    Ok(body
        .results
        .into_iter()
        .take(cfg.online_limit)
        .map(|p| {
            let repo = p.repo.unwrap_or_else(|| "official".to_string());
            online_hit(p.pkgname, repo, p.pkgdesc)
        })
        .collect())
}

pub fn search_aur(
    client: &Client,
    cfg: &SearchConfig,
    query: &str,
) -> anyhow::Result<Vec<SearchHit>> {
    let body: AurResponse = fetch_json(
        client,
        &cfg.aur_url,
        &[("v", "5"), ("type", "search"), ("arg", query)],
    )?;
    Ok(body
        .results
        .into_iter()
        .take(cfg.online_limit)
        .map(|p| online_hit(p.name, AUR_REPO.to_string(), p.description))
        .collect())
}

/// Queries both live sources in parallel. A failing source contributes no
/// hits; it never fails the whole search.
pub fn search_online(cfg: &SearchConfig, query: &str) -> anyhow::Result<OnlineHits> {
    let client = Client::builder().timeout(cfg.timeout()).build()?;

    let (official, aur) = std::thread::scope(|s| {
        let official = s.spawn(|| search_official(&client, cfg, query));
        let aur = s.spawn(|| search_aur(&client, cfg, query));
        (official.join(), aur.join())
    });

    Ok(OnlineHits {
        official: settle("official", official),
        aur: settle("aur", aur),
    })
}

fn settle(
    source: &str,
    joined: std::thread::Result<anyhow::Result<Vec<SearchHit>>>,
) -> Vec<SearchHit> {
    match joined {
        Ok(Ok(hits)) => {
            tracing::debug!(source, count = hits.len(), "online source answered");
            hits
        }
        Ok(Err(e)) => {
            tracing::warn!(source, error = %e, "online source failed");
            Vec::new()
        }
        Err(_) => {
            tracing::warn!(source, "online source worker panicked");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn official_payload_maps_fields_and_defaults() {
        let body: OfficialResponse = serde_json::from_str(
            r#"{"results":[
                {"pkgname":"gimp","repo":"extra","pkgdesc":"GNU Image Manipulation Program"},
                {"pkgname":"bare"}
            ]}"#,
        )
        .unwrap();
        let hits: Vec<_> = body
            .results
            .into_iter()
            .map(|p| online_hit(p.pkgname, p.repo.unwrap_or_else(|| "official".into()), p.pkgdesc))
            .collect();
        assert_eq!(hits[0].repo, "extra");
        assert_eq!(hits[0].install_command, "sudo pacman -S gimp");
        assert_eq!(hits[1].repo, "official");
        assert_eq!(hits[1].desc, "No description.");
    }

    #[test]
    fn aur_payload_tolerates_null_description() {
        let body: AurResponse = serde_json::from_str(
            r#"{"resultcount":1,"results":[{"Name":"gimp-git","Description":null}]}"#,
        )
        .unwrap();
        let p = body.results.into_iter().next().unwrap();
        let hit = online_hit(p.name, AUR_REPO.to_string(), p.description);
        assert_eq!(hit.desc, "No description.");
        assert_eq!(hit.install_command, "yay -S gimp-git");
    }

    #[test]
    fn unreachable_sources_yield_empty_hits() {
        let cfg = SearchConfig {
            official_url: "http://127.0.0.1:9/official".to_string(),
            aur_url: "http://127.0.0.1:9/aur".to_string(),
            timeout_ms: 500,
            ..SearchConfig::default()
        };
        let hits = search_online(&cfg, "editor").unwrap();
        assert!(hits.official.is_empty());
        assert!(hits.aur.is_empty());
    }
}
