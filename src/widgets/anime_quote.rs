//! Anime quotes

use crate::fetch::provider::non_empty_str;
use crate::fetch::{InvalidUrl, Provider, RequestDescriptor, Resource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const NAME: &str = "anime-quote";

const ANIMECHAN_URL: &str = "https://api.animechan.io/v1/quotes/random";
const ANIMECHAN_LEGACY_URL: &str = "https://animechan.xyz/api/random";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeQuote {
    pub quote: String,
    pub character: String,
    pub anime: String,
}

impl fmt::Display for AnimeQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" - {} ({})", self.quote, self.character, self.anime)
    }
}

pub fn fallback() -> AnimeQuote {
    AnimeQuote {
        quote: "Believe in the me that believes in you.".to_string(),
        character: "Kamina".to_string(),
        anime: "Tengen Toppa Gurren Lagann".to_string(),
    }
}

/// `{"status": "success", "data": {"content": "...", "anime": {"name": ...}, "character": {"name": ...}}}`
pub fn parse_animechan(document: &Value) -> Option<AnimeQuote> {
    if document["status"].as_str() != Some("success") {
        return None;
    }
    let data = &document["data"];

    Some(AnimeQuote {
        quote: non_empty_str(&data["content"])?,
        character: non_empty_str(&data["character"]["name"])
            .unwrap_or_else(|| "Unknown".to_string()),
        anime: non_empty_str(&data["anime"]["name"]).unwrap_or_else(|| "Unknown".to_string()),
    })
}

/// `{"anime": "...", "character": "...", "quote": "..."}`
pub fn parse_animechan_legacy(document: &Value) -> Option<AnimeQuote> {
    Some(AnimeQuote {
        quote: non_empty_str(&document["quote"])?,
        character: non_empty_str(&document["character"]).unwrap_or_else(|| "Unknown".to_string()),
        anime: non_empty_str(&document["anime"]).unwrap_or_else(|| "Unknown".to_string()),
    })
}

pub fn resource() -> Result<Resource<AnimeQuote>, InvalidUrl> {
    Ok(Resource::new(
        NAME,
        vec![
            Provider::json("animechan", RequestDescriptor::get(ANIMECHAN_URL)?, parse_animechan)
                .with_rank(1),
            Provider::json(
                "animechan-legacy",
                RequestDescriptor::get(ANIMECHAN_LEGACY_URL)?,
                parse_animechan_legacy,
            )
            .with_rank(2),
        ],
        fallback(),
    ))
}
