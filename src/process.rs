use std::collections::HashMap;

use chrono::Local;
use tracing::info;
use url::Url;

use crate::{
    attributes,
    cache::Cache,
    fetch::Fetcher,
    game_ids::load_game_ids,
    info_time,
    limiter::RateLimiter,
    links::{enumerate_entities, EntityLink},
    media::{extract_media, MediaSummary},
    persist::{entity_folder, write_record},
    record::{AttributeRecord, Field},
    request::{HttpTransport, Transport},
    teams::{team_roster, TeamRoster},
    Config, Result,
};

/// What a run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HarvestSummary {
    pub entities: usize,
    pub images_downloaded: usize,
    pub images_skipped: usize,
    /// Network requests issued, cache hits excluded.
    pub requests: usize,
}

/// Scrapes the live site described by `config`.
pub async fn process_site(config: &Config) -> Result<HarvestSummary> {
    let transport = HttpTransport::new(config)?;
    harvest(config, transport).await
}

/// Runs the whole pipeline over `transport`: index -> per character page -> images and attributes.
///
/// Characters are processed one at a time. The first error stops the run, but the cache is
/// saved either way so a rerun only fetches what is still missing.
pub async fn harvest<T: Transport>(config: &Config, transport: T) -> Result<HarvestSummary> {
    let start_time = Local::now();
    info_time!("Started scraping {}", config.base_url);

    let cache = Cache::load(&config.cache_file, config.cache_ttl).await;
    let mut fetcher = Fetcher::new(transport, cache, RateLimiter::new(config.request_delay));

    let result = process_entities(config, &mut fetcher).await;
    let flushed = fetcher.finish().await;
    let mut summary = result?;
    flushed?;
    summary.requests = fetcher.requests();

    info_time!(
        start_time,
        "Finished {} characters: {} images downloaded, {} already present, {} requests",
        summary.entities,
        summary.images_downloaded,
        summary.images_skipped,
        summary.requests
    );
    Ok(summary)
}

async fn process_entities<T: Transport>(
    config: &Config,
    fetcher: &mut Fetcher<T>,
) -> Result<HarvestSummary> {
    let base = Url::parse(&config.base_url)?;
    tokio::fs::create_dir_all(&config.out_dir).await?;

    let roster = team_roster(&fetcher.fetch(&config.teams_url()).await?);
    let game_ids = load_game_ids(&config.game_ids_file).await;
    let links = enumerate_entities(&fetcher.fetch(&config.index_url()).await?, &config.category_anchor);
    info_time!("Found {} characters", links.len());

    let mut summary = HarvestSummary::default();
    for link in &links {
        let media = process_entity(config, fetcher, &base, link, &roster, &game_ids).await?;
        summary.entities += 1;
        summary.images_downloaded += media.downloaded;
        summary.images_skipped += media.skipped;
    }
    Ok(summary)
}

async fn process_entity<T: Transport>(
    config: &Config,
    fetcher: &mut Fetcher<T>,
    base: &Url,
    link: &EntityLink,
    roster: &TeamRoster,
    game_ids: &HashMap<String, String>,
) -> Result<MediaSummary> {
    let name = &link.display_name;
    let folder = entity_folder(&config.out_dir, name);
    tokio::fs::create_dir_all(&folder).await?;

    let page = fetcher.fetch(base.join(&link.detail_href)?.as_str()).await?;
    let media = extract_media(fetcher, &page, base, &folder).await?;

    let mut record = attributes::extract(&page);
    let mut lookups = AttributeRecord::new();
    if let Some(teams) = roster.get(name) {
        lookups.set_raw(Field::Teams, &teams.join(", "));
    }
    if let Some(game_id) = game_ids.get(name) {
        lookups.set_raw(Field::GameId, game_id);
    }
    record.merge(lookups);

    write_record(&folder, &record).await?;
    info!(character = %name, fields = record.len(), images = media.downloaded, "done");
    Ok(media)
}
