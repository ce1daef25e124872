use crate::announce::{Announcement, AnnouncementSink};
use crate::error::TransportError;
use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use spark_detect::{DetectionFrame, DetectionSource};
use std::ops::Deref;
use zenoh::handlers::FifoChannelHandler;
use zenoh::pubsub::Subscriber;
use zenoh::sample::Sample;
use zenoh::{Session, Wait};

/// A zenoh session shared by the announcer and the frame source.
#[derive(Clone)]
pub struct ZenohLink {
    session: Session,
}

impl Deref for ZenohLink {
    type Target = Session;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl ZenohLink {
    pub async fn open() -> Result<Self> {
        let session = zenoh::open(zenoh::Config::default())
            .await
            .map_err(|e| anyhow!("failed to open zenoh session: {e}"))?;
        info!("Opened zenoh session {}", session.zid());
        Ok(Self { session })
    }

    pub fn announcer(&self, key: impl Into<String>) -> ZenohAnnouncer {
        ZenohAnnouncer {
            session: self.session.clone(),
            key: key.into(),
        }
    }

    pub async fn frame_source(&self, key: &str) -> Result<ZenohFrameSource> {
        let subscriber = self
            .declare_subscriber(key.to_string())
            .await
            .map_err(|e| anyhow!("failed to subscribe to {key}: {e}"))?;
        info!("Subscribed to detection frames on {}", key);
        Ok(ZenohFrameSource { subscriber })
    }
}

/// Publishes block/resume codes for the route planner. The code is the payload;
/// a sequence id, when present, rides along as a little-endian `u32` attachment.
pub struct ZenohAnnouncer {
    session: Session,
    key: String,
}

impl AnnouncementSink for ZenohAnnouncer {
    fn announce(&self, announcement: &Announcement<'_>) -> Result<(), TransportError> {
        let mut put = self
            .session
            .put(self.key.as_str(), announcement.code.to_owned());
        if let Some(id) = announcement.sequence_id {
            put = put.attachment(id.to_le_bytes().to_vec());
        }
        put.wait()
            .map_err(|e| TransportError::unavailable("zenoh announcer", e))?;
        debug!("Published {} on {}", announcement, self.key);
        Ok(())
    }
}

/// Detection frames delivered as JSON payloads on a zenoh key expression.
pub struct ZenohFrameSource {
    subscriber: Subscriber<FifoChannelHandler<Sample>>,
}

impl DetectionSource for ZenohFrameSource {
    async fn next_frame(&mut self) -> Result<Option<DetectionFrame>> {
        while let Ok(sample) = self.subscriber.recv_async().await {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<DetectionFrame>(&payload) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => warn!("Skipping malformed frame from {}: {}", sample.key_expr(), e),
            }
        }

        Ok(None)
    }
}
