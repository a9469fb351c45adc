use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::GRID_COLS;

/// Card identifier. Provisional ids are local placeholders handed out at
/// creation time; durable ids come back from the persistence store. Only
/// durable ids are ever sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardId {
    Provisional(u64),
    Durable(String),
}

impl CardId {
    pub fn is_provisional(&self) -> bool {
        matches!(self, CardId::Provisional(_))
    }

    pub fn as_durable(&self) -> Option<&str> {
        match self {
            CardId::Durable(id) => Some(id),
            CardId::Provisional(_) => None,
        }
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardId::Provisional(n) => write!(f, "temp-{n}"),
            CardId::Durable(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Profile,
    Social,
    Media,
    Map,
    Github,
    Text,
    Link,
    Title,
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardType::Profile => "profile",
            CardType::Social => "social",
            CardType::Media => "media",
            CardType::Map => "map",
            CardType::Github => "github",
            CardType::Text => "text",
            CardType::Link => "link",
            CardType::Title => "title",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialContent {
    pub platform: String,
    pub username: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers: Option<String>,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Gif,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectPosition {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaContent {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_position: Option<ObjectPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_scale: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapStyle {
    Light,
    Dark,
    Satellite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapContent {
    pub lat: f64,
    pub lng: f64,
    pub zoom: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<MapStyle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubStats {
    pub repos: u32,
    pub followers: u32,
    pub contributions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubContent {
    pub username: String,
    pub show_contributions: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<GithubStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkContent {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileContent {
    pub avatar: String,
    pub name: String,
    pub role: String,
    pub bio: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum CardContent {
    Profile(ProfileContent),
    Social(SocialContent),
    Media(MediaContent),
    Map(MapContent),
    Github(GithubContent),
    Text(TextContent),
    Link(LinkContent),
    Title(TitleContent),
}

impl CardContent {
    pub fn kind(&self) -> CardType {
        match self {
            CardContent::Profile(_) => CardType::Profile,
            CardContent::Social(_) => CardType::Social,
            CardContent::Media(_) => CardType::Media,
            CardContent::Map(_) => CardType::Map,
            CardContent::Github(_) => CardType::Github,
            CardContent::Text(_) => CardType::Text,
            CardContent::Link(_) => CardType::Link,
            CardContent::Title(_) => CardType::Title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Gradient,
    Solid,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

/// Visual overrides, independent of geometry. All fields optional so the
/// same type doubles as a patch: merging keeps fields the patch omits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<OverlayConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f32>,
}

impl CardStyle {
    pub fn merge(&mut self, patch: CardStyle) {
        if patch.background_color.is_some() {
            self.background_color = patch.background_color;
        }
        if patch.text_color.is_some() {
            self.text_color = patch.text_color;
        }
        if patch.overlay.is_some() {
            self.overlay = patch.overlay;
        }
        if patch.blur.is_some() {
            self.blur = patch.blur;
        }
        if patch.brightness.is_some() {
            self.brightness = patch.brightness;
        }
        if patch.contrast.is_some() {
            self.contrast = patch.contrast;
        }
        if patch.saturation.is_some() {
            self.saturation = patch.saturation;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    #[serde(rename = "type")]
    pub kind: CardType,
    pub position: Position,
    pub size: Size,
    pub content: CardContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<CardStyle>,
    #[serde(default)]
    pub z_index: i32,
}

/// Everything the caller supplies to create a card. Id and position are
/// always assigned by the store.
#[derive(Debug, Clone)]
pub struct CardDraft {
    pub kind: CardType,
    pub size: Size,
    pub content: CardContent,
    pub style: Option<CardStyle>,
    pub z_index: i32,
}

impl CardDraft {
    pub fn new(kind: CardType, size: Size, content: CardContent) -> Self {
        Self {
            kind,
            size,
            content,
            style: None,
            z_index: 0,
        }
    }
}

pub fn size_bounds(kind: CardType) -> (Size, Size) {
    match kind {
        CardType::Title => (Size::new(2, 1), Size::new(GRID_COLS, 1)),
        CardType::Profile => (Size::new(2, 2), Size::new(4, 4)),
        _ => (Size::new(1, 1), Size::new(4, 2)),
    }
}

pub fn clamp_size(kind: CardType, size: Size) -> Size {
    let (min, max) = size_bounds(kind);
    Size::new(
        size.width.clamp(min.width, max.width),
        size.height.clamp(min.height, max.height),
    )
}
