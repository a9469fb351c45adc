use serde::{Deserialize, Serialize};

pub const PROFILE_TAG_MAX: usize = 5;
pub const PROFILE_BIO_MAX: usize = 280;

pub const DEFAULT_AVATAR_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub avatar: String,
    pub name: String,
    pub title: String,
    pub tags: Vec<String>,
    pub bio: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            avatar: DEFAULT_AVATAR_URL.to_string(),
            name: String::new(),
            title: String::new(),
            tags: vec![String::new(), String::new(), String::new()],
            bio: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl Profile {
    /// Shallow merge, with the tag and bio caps enforced on the way in.
    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(avatar) = patch.avatar {
            self.avatar = avatar;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(mut tags) = patch.tags {
            tags.truncate(PROFILE_TAG_MAX);
            self.tags = tags;
        }
        if let Some(bio) = patch.bio {
            self.bio = bio.chars().take(PROFILE_BIO_MAX).collect();
        }
    }
}
