use std::fmt::{Display, Formatter};

use anyhow::Result;
use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::SeedableRng;
use spdlog::{error, info, warn};

use crate::config::{Config, Instagram};
use crate::content::{Content, ContentCategory, ContentType};
use crate::creator::CreatorAgent;
use crate::instagram::credentials::Credentials;
use crate::instagram::graph_client::GraphClient;
use crate::instagram::InstagramApi;
use crate::poster::PosterAgent;
use crate::supervisor::{EngagementMetrics, SupervisorAgent};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Select a concept and render a new content item
    Create,
    /// Post the newest content item not posted yet
    Post,
    /// Verify the newest posted item and run a health check
    Supervise,
    /// Create, post and supervise in one run
    FullCycle,
}

impl Mode {
    fn creates(&self) -> bool {
        matches!(self, Mode::Create | Mode::FullCycle)
    }

    fn posts(&self) -> bool {
        matches!(self, Mode::Post | Mode::FullCycle)
    }

    fn supervises(&self) -> bool {
        matches!(self, Mode::Supervise | Mode::FullCycle)
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mode::Create => "create",
            Mode::Post => "post",
            Mode::Supervise => "supervise",
            Mode::FullCycle => "full-cycle",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Debug)]
pub struct RunOptions {
    pub mode: Mode,
    pub category: Option<ContentCategory>,
    pub content_type: Option<ContentType>,
    pub seed: Option<u64>,
}

/// What happened during one run.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub content: Option<Content>,
    pub verified: Option<bool>,
    pub metrics: Option<EngagementMetrics>,
    pub healthy: Option<bool>,
}

fn build_client(settings: &Instagram, credentials: Option<&Credentials>) -> Option<Box<dyn InstagramApi>> {
    let credentials = credentials?.clone();
    match GraphClient::new(settings, credentials) {
        Ok(client) => Some(Box::new(client)),
        Err(e) => {
            error!("Error creating Instagram client: {:#}", e);
            None
        }
    }
}

pub struct Pipeline {
    creator: CreatorAgent,
    poster: PosterAgent,
    supervisor: SupervisorAgent,
}

impl Pipeline {
    pub fn from_config(config: &Config) -> Result<Pipeline> {
        let creator = CreatorAgent::new(config)?;
        let credentials = Credentials::from_env(config.instagram.env_file.as_deref());
        let poster = PosterAgent::new(build_client(&config.instagram, credentials.as_ref()));
        let supervisor = SupervisorAgent::new(build_client(&config.instagram, credentials.as_ref()));
        Ok(Self::with_agents(creator, poster, supervisor))
    }

    pub fn with_agents(creator: CreatorAgent, poster: PosterAgent, supervisor: SupervisorAgent) -> Pipeline {
        Pipeline {
            creator,
            poster,
            supervisor,
        }
    }

    fn post(&self, content: &mut Content) -> Result<()> {
        if !content.has_image() {
            warn!("Content {} has no image, skipping post", content.id);
            return Ok(());
        }

        match self.poster.post_content(content) {
            Some(post_id) => {
                content.mark_posted(post_id);
                self.creator.store().save(content)?;
                info!("Content posted. Post id: {}", content.post_id.as_deref().unwrap_or_default());
            }
            None => error!("Failed to post content {}", content.id),
        }
        Ok(())
    }

    fn supervise(&self, content: Option<&Content>, report: &mut CycleReport) {
        match content.and_then(|c| c.post_id.as_deref().map(|id| (c, id))) {
            Some((content, post_id)) => {
                let verified = self.supervisor.verify_post(post_id, Some(&content.caption));
                if verified {
                    info!("Post {} verified", post_id);
                    report.metrics = self.supervisor.collect_engagement_metrics(post_id);
                } else {
                    error!("Verification of post {} failed", post_id);
                }
                report.verified = Some(verified);
            }
            None => info!("No recent post id to supervise"),
        }

        let healthy = self.supervisor.health_check();
        if healthy {
            info!("System health check: OK");
        } else {
            warn!("System health check: FAILED");
        }
        report.healthy = Some(healthy);
    }

    pub fn run(&self, options: &RunOptions) -> Result<CycleReport> {
        info!("Running in {} mode", options.mode);
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut report = CycleReport::default();
        let mode = options.mode;

        if mode.creates() {
            report.content = self.creator.create_content(options.category, options.content_type, &mut rng);
            match report.content {
                Some(ref c) => match c.image_path {
                    Some(ref path) => info!("Image generated: {}", path.display()),
                    None => warn!("No image generated for content {}", c.id),
                },
                None => error!("Creator produced no content"),
            }
        }

        if mode.posts() {
            if mode == Mode::Post {
                report.content = self.creator.store().latest_unposted()?;
            }
            match report.content {
                Some(ref mut content) => self.post(content)?,
                None => warn!("No content available to post"),
            }
        }

        if mode.supervises() {
            let content = if mode == Mode::Supervise {
                self.creator.store().latest_posted()?
            } else {
                report.content.clone()
            };
            self.supervise(content.as_ref(), &mut report);
            if mode == Mode::Supervise {
                report.content = content;
            }
        }

        Ok(report)
    }
}
