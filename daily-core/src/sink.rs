//! Delivery of the finished payload.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::{Config, ENV_APP_ID, ENV_APP_SECRET},
    error::SinkError,
    model::NotificationPayload,
};

pub const DEFAULT_WECHAT_BASE_URL: &str = "https://api.weixin.qq.com";

/// What the platform returned for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub message_id: Option<i64>,
    pub detail: String,
}

impl std::fmt::Display for SendReceipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.message_id {
            Some(id) => write!(f, "msgid={id} ({})", self.detail),
            None => f.write_str(&self.detail),
        }
    }
}

/// A templated-messaging service.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send_template(
        &self,
        recipient: &str,
        template_id: &str,
        payload: &NotificationPayload,
    ) -> Result<SendReceipt, SinkError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

#[derive(Debug, Serialize)]
struct TemplateMessage<'a> {
    touser: &'a str,
    template_id: &'a str,
    data: &'a NotificationPayload,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
    msgid: Option<i64>,
}

/// WeChat Official Account template messages.
///
/// Each send exchanges the app credentials for a fresh access token first;
/// a run sends a single message, so the token is not cached.
#[derive(Debug, Clone)]
pub struct WeChatSink {
    http: Client,
    base_url: String,
    app_id: String,
    app_secret: String,
}

impl WeChatSink {
    pub fn new(http: Client, app_id: String, app_secret: String) -> Self {
        Self::with_base_url(http, app_id, app_secret, DEFAULT_WECHAT_BASE_URL)
    }

    pub fn with_base_url(
        http: Client,
        app_id: String,
        app_secret: String,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            app_id,
            app_secret,
        }
    }

    pub fn from_config(config: &Config, http: Client) -> Result<Self, SinkError> {
        let app_id = config
            .app_id
            .clone()
            .ok_or(SinkError::MissingCredential(ENV_APP_ID))?;
        let app_secret = config
            .app_secret
            .clone()
            .ok_or(SinkError::MissingCredential(ENV_APP_SECRET))?;

        Ok(Self::new(http, app_id, app_secret))
    }

    async fn access_token(&self) -> Result<String, SinkError> {
        let url = format!("{}/cgi-bin/token", self.base_url);
        debug!(url = %url, "requesting WeChat access token");

        let resp: TokenResponse = self
            .http
            .get(&url)
            .query(&[
                ("grant_type", "client_credential"),
                ("appid", self.app_id.as_str()),
                ("secret", self.app_secret.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if resp.errcode != 0 {
            return Err(SinkError::Api {
                code: resp.errcode,
                message: resp.errmsg,
            });
        }

        resp.access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SinkError::UnexpectedResponse("token response without access_token".into()))
    }
}

#[async_trait]
impl NotificationSink for WeChatSink {
    async fn send_template(
        &self,
        recipient: &str,
        template_id: &str,
        payload: &NotificationPayload,
    ) -> Result<SendReceipt, SinkError> {
        let token = self.access_token().await?;
        let url = format!("{}/cgi-bin/message/template/send", self.base_url);

        let message = TemplateMessage {
            touser: recipient,
            template_id,
            data: payload,
        };

        let resp: SendResponse = self
            .http
            .post(&url)
            .query(&[("access_token", token.as_str())])
            .json(&message)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if resp.errcode != 0 {
            return Err(SinkError::Api {
                code: resp.errcode,
                message: resp.errmsg,
            });
        }

        info!(msgid = ?resp.msgid, "template message accepted");
        Ok(SendReceipt {
            message_id: resp.msgid,
            detail: resp.errmsg,
        })
    }
}
