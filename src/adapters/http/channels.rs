//! Static catalog of broadcast channels.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ChannelInfo {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ChannelCatalog {
    pub success: bool,
    pub channels: Vec<ChannelInfo>,
}

/// The channels clients can subscribe to.
///
/// Subscribing to a name outside this list is allowed; nothing will
/// ever broadcast on it.
pub fn channel_catalog() -> Vec<ChannelInfo> {
    vec![
        ChannelInfo {
            name: "cctv_detection",
            description: "Live CCTV detection events",
        },
        ChannelInfo {
            name: "social_analysis",
            description: "Social media analysis results",
        },
        ChannelInfo {
            name: "system_status",
            description: "System status updates",
        },
    ]
}

/// `GET /api/channels`
pub async fn list_channels() -> Json<ChannelCatalog> {
    Json(ChannelCatalog {
        success: true,
        channels: channel_catalog(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn catalog_lists_the_three_feeds() {
        let Json(body) = list_channels().await;
        assert!(body.success);

        let names: Vec<_> = body.channels.iter().map(|c| c.name).collect();
        assert_eq!(names, ["cctv_detection", "social_analysis", "system_status"]);
    }
}
