//! Random activity suggestions

use crate::fetch::provider::non_empty_str;
use crate::fetch::{InvalidUrl, Provider, RequestDescriptor, Resource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const NAME: &str = "activity";

const APPBREWERY_URL: &str = "https://bored-api.appbrewery.com/random";
const BOREDAPI_URL: &str = "https://www.boredapi.com/api/activity";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub activity: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub participants: u32,
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.activity)?;
        if self.kind != "none" {
            write!(f, " [{}, {} participant(s)]", self.kind, self.participants)?;
        }
        Ok(())
    }
}

pub fn fallback() -> Activity {
    Activity {
        activity: "Bored? Use a VPN or just admire a kitten".to_string(),
        kind: "none".to_string(),
        participants: 1,
    }
}

/// Both Bored API flavours share this shape. Error documents
/// (`{"error": "..."}`) have no `activity` and yield nothing.
pub fn parse_activity(document: &Value) -> Option<Activity> {
    Some(Activity {
        activity: non_empty_str(&document["activity"])?,
        kind: non_empty_str(&document["type"]).unwrap_or_else(|| "unknown".to_string()),
        participants: document["participants"]
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(1),
    })
}

pub fn resource() -> Result<Resource<Activity>, InvalidUrl> {
    Ok(Resource::new(
        NAME,
        vec![
            Provider::json("appbrewery", RequestDescriptor::get(APPBREWERY_URL)?, parse_activity)
                .with_rank(1),
            Provider::json("boredapi", RequestDescriptor::get(BOREDAPI_URL)?, parse_activity)
                .with_rank(2),
        ],
        fallback(),
    ))
}
