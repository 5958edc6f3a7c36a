use crate::domain_port::PartyParticipationRepo;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Physically removes expired invites. Reads already ignore them; this only reclaims space.
pub struct InviteReaper {
    party_participation_repo: Arc<dyn PartyParticipationRepo>,
    interval: Duration,
    cancellation_token: CancellationToken,
}

impl InviteReaper {
    pub fn new(
        party_participation_repo: Arc<dyn PartyParticipationRepo>,
        interval: Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            party_participation_repo,
            interval,
            cancellation_token,
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval = ?self.interval, "invite reaper started");

        loop {
            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    info!("invite reaper shutting down...");
                    break;
                }
                _ = ticker.tick() => {
                    match self.party_participation_repo.purge_expired_invites(Utc::now()).await {
                        Ok(0) => debug!("no expired invites"),
                        Ok(purged) => info!(purged, "expired invites purged"),
                        Err(e) => warn!("invite purge failed: {e}"),
                    }
                }
            }
        }

        Ok(())
    }
}
