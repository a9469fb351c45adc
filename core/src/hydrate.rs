use crate::card::{
    Card, CardContent, CardId, MapContent, MapStyle, Position, Size, SocialContent, TextContent,
    TitleContent,
};
use crate::grid::auto_assign_positions;

/// Largest inline media url (data urls included) a card may carry into the
/// store. Anything bigger hydrates with the url cleared so one corrupt card
/// cannot take the whole board down.
pub const MAX_INLINE_MEDIA_BYTES: usize = 1_000_000;

/// Returns true when the card was degraded.
pub fn strip_oversized_content(card: &mut Card) -> bool {
    if let CardContent::Media(media) = &mut card.content {
        if media.url.len() > MAX_INLINE_MEDIA_BYTES {
            media.url.clear();
            return true;
        }
    }
    false
}

/// Sanitize a remote card collection before it becomes store state: strip
/// oversized inline media, then re-layout if the stored positions overlap
/// (layouts saved under an older, narrower grid land here).
pub fn prepare_hydrated_cards(mut cards: Vec<Card>) -> Vec<Card> {
    for card in &mut cards {
        strip_oversized_content(card);
    }
    auto_assign_positions(cards)
}

fn social(id: &str, platform: &str, username: &str, url: &str, icon: &str) -> (CardId, CardContent) {
    (
        CardId::Durable(id.to_string()),
        CardContent::Social(SocialContent {
            platform: platform.to_string(),
            username: username.to_string(),
            url: url.to_string(),
            followers: None,
            icon: icon.to_string(),
        }),
    )
}

fn card(id: CardId, content: CardContent, position: Position, size: Size) -> Card {
    Card {
        id,
        kind: content.kind(),
        position,
        size,
        content,
        style: None,
        z_index: 0,
    }
}

/// Default layout for a first-run profile.
pub fn starter_cards() -> Vec<Card> {
    let mut cards = vec![card(
        CardId::Durable("title-links".to_string()),
        CardContent::Title(TitleContent {
            text: "My Links".to_string(),
        }),
        Position::new(0, 0),
        Size::new(4, 1),
    )];

    let socials = [
        social(
            "social-1",
            "twitter",
            "@username",
            "https://twitter.com",
            "twitter",
        ),
        social(
            "social-2",
            "instagram",
            "@username",
            "https://instagram.com",
            "instagram",
        ),
        social(
            "social-3",
            "youtube",
            "@username",
            "https://youtube.com",
            "youtube",
        ),
        social(
            "social-4",
            "tiktok",
            "@username",
            "https://tiktok.com",
            "tiktok",
        ),
    ];
    for (i, (id, content)) in socials.into_iter().enumerate() {
        cards.push(card(
            id,
            content,
            Position::new(i as i32, 1),
            Size::new(1, 1),
        ));
    }

    cards.push(card(
        CardId::Durable("title-about".to_string()),
        CardContent::Title(TitleContent {
            text: "About".to_string(),
        }),
        Position::new(0, 2),
        Size::new(4, 1),
    ));
    cards.push(card(
        CardId::Durable("text-about".to_string()),
        CardContent::Text(TextContent {
            title: None,
            body: "Tell the world about yourself.".to_string(),
            markdown: None,
        }),
        Position::new(0, 3),
        Size::new(2, 1),
    ));
    cards.push(card(
        CardId::Durable("map-1".to_string()),
        CardContent::Map(MapContent {
            lat: 48.8566,
            lng: 2.3522,
            zoom: 12,
            style: Some(MapStyle::Light),
        }),
        Position::new(2, 3),
        Size::new(2, 1),
    ));

    cards
}
