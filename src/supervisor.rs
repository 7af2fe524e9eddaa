use chrono::{DateTime, Utc};
use serde::Serialize;
use spdlog::{error, info, warn};

use crate::instagram::InstagramApi;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementMetrics {
    pub post_id: String,
    pub likes: u64,
    pub comments: u64,
    pub collected_at: DateTime<Utc>,
}

/// Post verification, health checks and metric collection.
///
/// Without an API client verification and health checks succeed and no metrics
/// are collected. Alerts are only logged.
pub struct SupervisorAgent {
    client: Option<Box<dyn InstagramApi>>,
}

impl SupervisorAgent {
    pub fn new(client: Option<Box<dyn InstagramApi>>) -> Self {
        info!("SupervisorAgent ready (client: {})", client.is_some());
        SupervisorAgent { client }
    }

    pub fn alert(&self, message: &str) {
        error!("ALERT: {}", message);
    }

    pub fn verify_post(&self, post_id: &str, expected_caption: Option<&str>) -> bool {
        info!("Verifying post {}", post_id);
        let Some(ref client) = self.client else {
            warn!("No Instagram client, verification of {} simulated", post_id);
            return true;
        };

        match client.media_info(post_id) {
            Ok(Some(media)) => {
                if let Some(permalink) = media.permalink.as_deref() {
                    info!("Post {} is online at {}", post_id, permalink);
                }
                match expected_caption {
                    Some(expected) if media.caption.as_deref().map(str::trim) != Some(expected.trim()) => {
                        self.alert(&format!("Caption of post {} differs from the expected one", post_id));
                        false
                    }
                    _ => true,
                }
            }
            Ok(None) => {
                self.alert(&format!("Post {} not found", post_id));
                false
            }
            Err(e) => {
                self.alert(&format!("Error verifying post {}: {:#}", post_id, e));
                false
            }
        }
    }

    pub fn collect_engagement_metrics(&self, post_id: &str) -> Option<EngagementMetrics> {
        info!("Collecting metrics for post {}", post_id);
        let Some(ref client) = self.client else {
            warn!("No Instagram client, metrics for {} not collected", post_id);
            return None;
        };

        match client.media_info(post_id) {
            Ok(Some(media)) => {
                let metrics = EngagementMetrics {
                    post_id: post_id.to_string(),
                    likes: media.like_count.unwrap_or(0),
                    comments: media.comments_count.unwrap_or(0),
                    collected_at: Utc::now(),
                };
                info!("Metrics for {}: {} likes, {} comments", post_id, metrics.likes, metrics.comments);
                Some(metrics)
            }
            Ok(None) => {
                warn!("Post {} not found while collecting metrics", post_id);
                None
            }
            Err(e) => {
                error!("Error collecting metrics for {}: {:#}", post_id, e);
                None
            }
        }
    }

    pub fn health_check(&self) -> bool {
        let Some(ref client) = self.client else {
            info!("Health check without Instagram client: OK");
            return true;
        };

        match client.health() {
            Ok(()) => true,
            Err(e) => {
                self.alert(&format!("Health check failed: {:#}", e));
                false
            }
        }
    }
}
