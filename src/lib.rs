//! UMAMUSUME WIKI SCRAPER
//! Harvests character attributes and artwork from umamusu.wiki into one folder per character.

mod macros;

pub mod attributes;
pub mod cache;
pub mod config;
mod error;
pub mod fetch;
pub mod game_ids;
pub mod limiter;
pub mod links;
pub mod media;
pub mod parse;
pub mod persist;
pub mod process;
pub mod record;
pub mod request;
pub mod teams;

pub use config::Config;
pub use error::{Error, Result};

const BASE_URL: &str = "https://umamusu.wiki";
const INDEX_PATH: &str = "/List_of_Characters";
const TEAMS_PATH: &str = "/Teams_and_Clubs";
/// `id` of the heading anchor that opens the character section of the index page.
const CATEGORY_ANCHOR: &str = "Umamusume";
const OUT_FOLDER: &str = "umamusume";
const CACHE_FILE: &str = "cache.bin";
const GAME_IDS_FILE: &str = "uma_game_ids.json";
const ATTRIBUTES_FILE: &str = "attributes.json";
const REQUEST_DELAY_MS: u64 = 1000;
const CACHE_TTL_DAYS: i64 = 7;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("umascrap/", env!("CARGO_PKG_VERSION"));
