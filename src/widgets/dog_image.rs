//! Random dog pictures

use crate::fetch::provider::non_empty_str;
use crate::fetch::{InvalidUrl, Provider, RequestDescriptor, Resource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use url::Url;

pub const NAME: &str = "dog-image";

const DOG_CEO_URL: &str = "https://dog.ceo/api/breeds/image/random";
const RANDOM_DOG_URL: &str = "https://random.dog/woof.json";

/// Shown when no dog could be fetched
const FALLBACK_IMAGE_URL: &str = "https://placekitten.com/300/300";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DogImage {
    pub url: String,
}

impl fmt::Display for DogImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

pub fn fallback() -> DogImage {
    DogImage {
        url: FALLBACK_IMAGE_URL.to_string(),
    }
}

/// Accept only absolute http(s) URLs that point at a still image
fn image_url(candidate: &str) -> Option<DogImage> {
    let url = Url::parse(candidate).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let extension = url.path().rsplit('.').next()?.to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .contains(&extension.as_str())
        .then(|| DogImage {
            url: url.to_string(),
        })
}

/// `{"message": "https://...", "status": "success"}`
pub fn parse_dog_ceo(document: &Value) -> Option<DogImage> {
    if document["status"].as_str() != Some("success") {
        return None;
    }
    image_url(&non_empty_str(&document["message"])?)
}

/// `{"fileSizeBytes": 1234, "url": "https://..."}`. random.dog also serves
/// videos, which are skipped.
pub fn parse_random_dog(document: &Value) -> Option<DogImage> {
    image_url(&non_empty_str(&document["url"])?)
}

pub fn resource() -> Result<Resource<DogImage>, InvalidUrl> {
    Ok(Resource::new(
        NAME,
        vec![
            Provider::json("dog-ceo", RequestDescriptor::get(DOG_CEO_URL)?, parse_dog_ceo)
                .with_rank(1),
            Provider::json("random-dog", RequestDescriptor::get(RANDOM_DOG_URL)?, parse_random_dog)
                .with_rank(2),
        ],
        fallback(),
    ))
}
