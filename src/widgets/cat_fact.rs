//! Cat facts

use crate::fetch::provider::non_empty_str;
use crate::fetch::{InvalidUrl, Provider, RequestDescriptor, Resource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const NAME: &str = "cat-fact";

const CATFACT_NINJA_URL: &str = "https://catfact.ninja/fact";
const MEOWFACTS_URL: &str = "https://meowfacts.herokuapp.com/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatFact {
    pub fact: String,
}

impl fmt::Display for CatFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fact)
    }
}

pub fn fallback() -> CatFact {
    CatFact {
        fact: "Cats spend around two thirds of their lives asleep.".to_string(),
    }
}

/// `{"fact": "...", "length": 42}`
pub fn parse_catfact_ninja(document: &Value) -> Option<CatFact> {
    non_empty_str(&document["fact"]).map(|fact| CatFact { fact })
}

/// `{"data": ["..."]}`
pub fn parse_meowfacts(document: &Value) -> Option<CatFact> {
    document["data"]
        .as_array()?
        .iter()
        .find_map(non_empty_str)
        .map(|fact| CatFact { fact })
}

pub fn resource() -> Result<Resource<CatFact>, InvalidUrl> {
    Ok(Resource::new(
        NAME,
        vec![
            Provider::json(
                "catfact-ninja",
                RequestDescriptor::get(CATFACT_NINJA_URL)?,
                parse_catfact_ninja,
            )
            .with_rank(1),
            Provider::json("meowfacts", RequestDescriptor::get(MEOWFACTS_URL)?, parse_meowfacts)
                .with_rank(2),
        ],
        fallback(),
    ))
}
