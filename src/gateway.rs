use std::fmt;

use futures::future::LocalBoxFuture;
use serde::Serialize;

use bentogurido_core::card::{Card, CardContent, CardStyle, CardType};
use bentogurido_core::profile::ProfilePatch;

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Network failure or a server-side fault. Retryable in principle.
    Transport(String),
    /// The remote store rejected the payload. Not retryable as-is.
    Validation(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Transport(msg) => write!(f, "transport error: {msg}"),
            GatewayError::Validation(msg) => write!(f, "rejected by server: {msg}"),
        }
    }
}

impl std::error::Error for GatewayError {}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardCreate {
    #[serde(rename = "type")]
    pub kind: CardType,
    pub position_x: i32,
    pub position_y: i32,
    pub size_width: i32,
    pub size_height: i32,
    pub content: CardContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<CardStyle>,
    pub z_index: i32,
    pub sort_order: i32,
}

impl CardCreate {
    pub fn from_card(card: &Card, sort_order: i32) -> Self {
        Self {
            kind: card.kind,
            position_x: card.position.x,
            position_y: card.position.y,
            size_width: card.size.width,
            size_height: card.size.height,
            content: card.content.clone(),
            style: card.style.clone(),
            z_index: card.z_index,
            sort_order,
        }
    }
}

/// Partial update. Absent fields are left untouched by the remote store.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_y: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_height: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<CardContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<CardStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

impl CardPatch {
    pub fn full(card: &Card) -> Self {
        Self {
            position_x: Some(card.position.x),
            position_y: Some(card.position.y),
            size_width: Some(card.size.width),
            size_height: Some(card.size.height),
            content: Some(card.content.clone()),
            style: card.style.clone(),
            z_index: Some(card.z_index),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderEntry {
    pub id: String,
    pub position_x: i32,
    pub position_y: i32,
}

/// Seam to the remote card store. Single-threaded futures; implementations
/// own their transport.
pub trait CardGateway {
    fn create_card(&self, body: CardCreate) -> LocalBoxFuture<'static, Result<String, GatewayError>>;
    fn update_card(
        &self,
        id: String,
        patch: CardPatch,
    ) -> LocalBoxFuture<'static, Result<(), GatewayError>>;
    fn delete_card(&self, id: String) -> LocalBoxFuture<'static, Result<(), GatewayError>>;
    fn reorder_batch(
        &self,
        entries: Vec<ReorderEntry>,
    ) -> LocalBoxFuture<'static, Result<(), GatewayError>>;
    fn update_profile(
        &self,
        patch: ProfilePatch,
    ) -> LocalBoxFuture<'static, Result<(), GatewayError>>;
}

/// The profile route renames two fields on the wire.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bio: Option<String>,
}

impl From<ProfilePatch> for ProfileBody {
    fn from(patch: ProfilePatch) -> Self {
        Self {
            avatar_url: patch.avatar,
            display_name: patch.name,
            title: patch.title,
            tags: patch.tags,
            bio: patch.bio,
        }
    }
}

/// Method, path, and JSON body of one request, before any transport gets
/// involved. The card API updates through `PUT` with partial bodies; a
/// settled swap is persisted as one `PUT` per card carrying its position.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WireRequest {
    pub method: &'static str,
    pub path: String,
    pub body: Option<String>,
}

fn encode_body<T: Serialize>(body: &T) -> Result<String, GatewayError> {
    serde_json::to_string(body).map_err(|e| GatewayError::Transport(e.to_string()))
}

pub(crate) fn create_request(body: &CardCreate) -> Result<WireRequest, GatewayError> {
    Ok(WireRequest {
        method: "POST",
        path: "/api/cards".to_string(),
        body: Some(encode_body(body)?),
    })
}

pub(crate) fn update_request(id: &str, patch: &CardPatch) -> Result<WireRequest, GatewayError> {
    Ok(WireRequest {
        method: "PUT",
        path: format!("/api/cards/{id}"),
        body: Some(encode_body(patch)?),
    })
}

pub(crate) fn delete_request(id: &str) -> WireRequest {
    WireRequest {
        method: "DELETE",
        path: format!("/api/cards/{id}"),
        body: None,
    }
}

pub(crate) fn reorder_requests(entries: &[ReorderEntry]) -> Result<Vec<WireRequest>, GatewayError> {
    entries
        .iter()
        .map(|entry| {
            let body = serde_json::json!({
                "positionX": entry.position_x,
                "positionY": entry.position_y,
            });
            Ok(WireRequest {
                method: "PUT",
                path: format!("/api/cards/{}", entry.id),
                body: Some(encode_body(&body)?),
            })
        })
        .collect()
}

pub(crate) fn profile_request(patch: ProfilePatch) -> Result<WireRequest, GatewayError> {
    Ok(WireRequest {
        method: "PUT",
        path: "/api/profile".to_string(),
        body: Some(encode_body(&ProfileBody::from(patch))?),
    })
}

#[cfg(target_arch = "wasm32")]
pub mod http {
    use futures::future::LocalBoxFuture;
    use futures::FutureExt;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, Response};

    use bentogurido_core::profile::ProfilePatch;

    use super::{
        create_request, delete_request, profile_request, reorder_requests, update_request,
        CardCreate, CardGateway, CardPatch, GatewayError, ReorderEntry, WireRequest,
    };

    /// JSON-over-fetch gateway against the profile API.
    pub struct HttpGateway {
        base_url: String,
    }

    impl HttpGateway {
        pub fn new(base_url: impl Into<String>) -> Self {
            Self {
                base_url: base_url.into(),
            }
        }
    }

    fn js_err(value: JsValue) -> GatewayError {
        GatewayError::Transport(format!("{value:?}"))
    }

    async fn send(base_url: String, request: WireRequest) -> Result<serde_json::Value, GatewayError> {
        fetch_json(request.method, format!("{base_url}{}", request.path), request.body).await
    }

    async fn fetch_json(
        method: &str,
        url: String,
        body: Option<String>,
    ) -> Result<serde_json::Value, GatewayError> {
        let opts = RequestInit::new();
        opts.set_method(method);
        if let Some(body) = body {
            opts.set_body(&JsValue::from_str(&body));
        }
        let request = Request::new_with_str_and_init(&url, &opts).map_err(js_err)?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_err)?;

        let window = web_sys::window()
            .ok_or_else(|| GatewayError::Transport("no window".to_string()))?;
        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_err)?;
        let response: Response = response.dyn_into().map_err(js_err)?;

        let status = response.status();
        let text = JsFuture::from(response.text().map_err(js_err)?)
            .await
            .map_err(js_err)?
            .as_string()
            .unwrap_or_default();

        if (400..500).contains(&status) {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str().map(String::from)))
                .unwrap_or_else(|| format!("status {status}"));
            return Err(GatewayError::Validation(message));
        }
        if !response.ok() {
            return Err(GatewayError::Transport(format!("status {status}")));
        }

        if text.is_empty() {
            Ok(serde_json::Value::Null)
        } else {
            serde_json::from_str(&text).map_err(|e| GatewayError::Transport(e.to_string()))
        }
    }

    impl CardGateway for HttpGateway {
        fn create_card(
            &self,
            body: CardCreate,
        ) -> LocalBoxFuture<'static, Result<String, GatewayError>> {
            let base_url = self.base_url.clone();
            async move {
                let value = send(base_url, create_request(&body)?).await?;
                value
                    .get("id")
                    .and_then(|id| id.as_str().map(String::from))
                    .ok_or_else(|| GatewayError::Transport("create response missing id".to_string()))
            }
            .boxed_local()
        }

        fn update_card(
            &self,
            id: String,
            patch: CardPatch,
        ) -> LocalBoxFuture<'static, Result<(), GatewayError>> {
            let base_url = self.base_url.clone();
            async move {
                send(base_url, update_request(&id, &patch)?).await?;
                Ok(())
            }
            .boxed_local()
        }

        fn delete_card(&self, id: String) -> LocalBoxFuture<'static, Result<(), GatewayError>> {
            let base_url = self.base_url.clone();
            async move {
                send(base_url, delete_request(&id)).await?;
                Ok(())
            }
            .boxed_local()
        }

        fn reorder_batch(
            &self,
            entries: Vec<ReorderEntry>,
        ) -> LocalBoxFuture<'static, Result<(), GatewayError>> {
            let base_url = self.base_url.clone();
            async move {
                for request in reorder_requests(&entries)? {
                    send(base_url.clone(), request).await?;
                }
                Ok(())
            }
            .boxed_local()
        }

        fn update_profile(
            &self,
            patch: ProfilePatch,
        ) -> LocalBoxFuture<'static, Result<(), GatewayError>> {
            let base_url = self.base_url.clone();
            async move {
                send(base_url, profile_request(patch)?).await?;
                Ok(())
            }
            .boxed_local()
        }
    }
}
