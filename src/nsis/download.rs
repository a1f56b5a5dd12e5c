//! GitHub release asset download.
//!
//! Resolves a release through the REST API, picks the first asset whose
//! name matches a pattern, and streams it to disk. An existing file with
//! the expected size is reused.

use super::error::{Error, ErrorExt, Result};
use regex::RegexBuilder;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use url::Url;

const GITHUB_API: &str = "https://api.github.com";

/// Which asset to fetch from which release.
#[derive(Clone, Debug)]
pub struct ReleaseQuery {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Release tag, or `latest`
    pub tag: String,
    /// Case-insensitive pattern matched at the start of asset names
    pub asset_pattern: String,
    /// Optional API token
    pub token: Option<String>,
}

/// Subset of the GitHub release payload.
#[derive(Debug, Deserialize)]
pub struct Release {
    /// Release assets in API order
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A downloadable release asset.
#[derive(Clone, Debug, Deserialize)]
pub struct Asset {
    /// File name
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Direct download URL
    pub browser_download_url: String,
}

/// Releases endpoint for `tag` (`latest` selects the latest release).
pub fn release_api_url(owner: &str, repo: &str, tag: &str) -> Result<Url> {
    let mut url = Url::parse(GITHUB_API)?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| Error::GenericError("GitHub API URL cannot be a base".into()))?;
        segments.pop_if_empty();
        segments.extend(["repos", owner, repo, "releases"]);
        if tag.eq_ignore_ascii_case("latest") {
            segments.push("latest");
        } else {
            segments.extend(["tags", tag]);
        }
    }
    Ok(url)
}

/// Decode a release payload returned by the GitHub API.
pub fn parse_release(body: &str) -> Result<Release> {
    Ok(serde_json::from_str(body)?)
}

/// First asset whose name matches `pattern` (case-insensitive, anchored at the start).
pub fn select_asset<'a>(release: &'a Release, pattern: &str) -> Result<&'a Asset> {
    let re = RegexBuilder::new(&format!("^(?:{pattern})"))
        .case_insensitive(true)
        .build()?;
    release
        .assets
        .iter()
        .find(|asset| re.is_match(&asset.name))
        .ok_or_else(|| Error::GenericError(format!("No asset matching \"{pattern}\"")))
}

/// Whether `path` already holds a complete copy of `asset`.
pub async fn is_reusable(path: &Path, asset: &Asset) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|m| m.is_file() && m.len() == asset.size)
}

fn client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

fn log_headers(label: &str, headers: &HeaderMap) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    let rendered: Vec<String> = headers
        .iter()
        .map(|(name, value)| {
            if *name == AUTHORIZATION {
                format!("{name}: <redacted>")
            } else {
                format!("{name}: {}", value.to_str().unwrap_or("<binary>"))
            }
        })
        .collect();
    log::debug!("    {} headers [{}]", label, rendered.join(", "));
}

/// Download the asset selected by `query` into `outdir`.
///
/// Returns the path of the downloaded (or reused) file.
pub async fn download_github_asset(query: &ReleaseQuery, outdir: &Path) -> Result<PathBuf> {
    let client = client()?;
    let url = release_api_url(&query.owner, &query.repo, &query.tag)?;

    let mut request = client
        .get(url.clone())
        .header(ACCEPT, "application/vnd.github.v3+json");
    match &query.token {
        Some(token) => {
            log::debug!("Info: Found valid GitHub token ({} chars)", token.len());
            request = request.bearer_auth(token);
        }
        None => log::warn!("No GitHub token provided, may run into API rate limits"),
    }

    let request = request.build()?;
    log_headers("Request", request.headers());
    let started = Instant::now();
    let response = client.execute(request).await?;
    log::info!(
        "GET {} --> {}, {} ms",
        url,
        response.status(),
        started.elapsed().as_millis()
    );
    log_headers("Response", response.headers());
    let release = parse_release(&response.error_for_status()?.text().await?)?;

    for asset in &release.assets {
        log::debug!(
            "> asset: \"{}\", {} bytes, {}",
            asset.name,
            asset.size,
            asset.browser_download_url
        );
    }

    let asset = select_asset(&release, &query.asset_pattern)?;
    let asset_path = outdir.join(&asset.name);

    if is_reusable(&asset_path, asset).await {
        log::info!("Reuse existing \"{}\"", asset_path.display());
        return Ok(asset_path);
    }

    fetch(&client, asset, query.token.as_deref(), outdir, &asset_path).await?;
    Ok(asset_path)
}

async fn fetch(
    client: &reqwest::Client,
    asset: &Asset,
    token: Option<&str>,
    outdir: &Path,
    asset_path: &Path,
) -> Result<()> {
    let mut request = client
        .get(&asset.browser_download_url)
        .header(ACCEPT, "application/octet-stream");
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let request = request.build()?;
    log_headers("Request", request.headers());
    let started = Instant::now();
    let mut response = client.execute(request).await?.error_for_status()?;

    tokio::fs::create_dir_all(outdir)
        .await
        .fs_context("creating download directory", outdir)?;
    let mut file = tokio::fs::File::create(asset_path)
        .await
        .fs_context("creating asset file", asset_path)?;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk)
            .await
            .fs_context("writing asset file", asset_path)?;
    }
    file.flush().await.fs_context("flushing asset file", asset_path)?;

    log::info!(
        "GET {} --> {}, {} ms",
        asset.browser_download_url,
        response.status(),
        started.elapsed().as_millis()
    );
    log_headers("Response", response.headers());
    Ok(())
}
