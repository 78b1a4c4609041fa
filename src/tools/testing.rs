//! Test fixtures shared by tool and agent tests.

use chrono::{Duration, Utc};

use crate::store::{
    CarolFilter, CarolStore, MemoryStore, MessageStore, StoreError, StoreResult,
};
use crate::types::{Carol, Energy, EventMessage};

/// Nine carols; six tagged christmas, in a fixed order.
pub fn songbook() -> MemoryStore {
    MemoryStore::with_carols(vec![
        Carol::new("jingle-bells", "Jingle Bells", "James Lord Pierpont", Energy::High, "2:10")
            .tags(["christmas", "upbeat", "classic"]),
        Carol::new("silent-night", "Silent Night", "Franz Gruber", Energy::Low, "2:50")
            .tags(["christmas", "religious", "traditional"])
            .lyrics(["Silent night, holy night", "All is calm, all is bright"]),
        Carol::new("deck-the-halls", "Deck the Halls", "Traditional", Energy::High, "1:50")
            .tags(["christmas", "traditional"]),
        Carol::new("o-holy-night", "O Holy Night", "Adolphe Adam", Energy::Low, "4:20")
            .tags(["christmas", "religious"]),
        Carol::new(
            "we-wish-you",
            "We Wish You a Merry Christmas",
            "Traditional",
            Energy::Medium,
            "1:40",
        )
        .tags(["christmas", "traditional"]),
        Carol::new(
            "hark-the-herald",
            "Hark! The Herald Angels Sing",
            "Felix Mendelssohn",
            Energy::Medium,
            "2:30",
        )
        .tags(["christmas", "religious", "traditional"]),
        Carol::new(
            "winter-wonderland",
            "Winter Wonderland",
            "Felix Bernard",
            Energy::Medium,
            "2:25",
        )
        .tags(["winter", "upbeat"]),
        Carol::new("let-it-snow", "Let It Snow", "Jule Styne", Energy::High, "2:35")
            .tags(["winter", "upbeat"]),
        Carol::new("auld-lang-syne", "Auld Lang Syne", "Robert Burns", Energy::Low, "3:10")
            .tags(["new-year", "traditional"]),
    ])
}

/// A songbook plus three chat messages (Ana, Ben, Cleo) for `event_id`.
pub async fn chat(event_id: &str) -> MemoryStore {
    let store = songbook();
    let now = Utc::now();
    let lines = [
        ("m-ana", "Ana", "Can't wait to sing carols this year"),
        ("m-ben", "Ben", "What time should we meet?"),
        ("m-cleo", "Cleo", "Venue is the old square by the fountain"),
    ];
    for (i, (id, name, text)) in lines.into_iter().enumerate() {
        let at = now - Duration::minutes(10 - i as i64);
        store
            .add_message(EventMessage::new(event_id, id, text).member_name(name).at(at))
            .await;
    }
    store
}

/// A store whose every query fails.
#[derive(Debug, Default)]
pub struct FailingStore;

#[async_trait::async_trait]
impl CarolStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn get_carols(&self, _filter: &CarolFilter) -> StoreResult<Vec<Carol>> {
        Err(StoreError::unavailable("connection refused"))
    }
}

#[async_trait::async_trait]
impl MessageStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn get_event_messages(&self, _event_id: &str) -> StoreResult<Vec<EventMessage>> {
        Err(StoreError::unavailable("connection refused"))
    }
}
