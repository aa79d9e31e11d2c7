//! Notification overlay: capture playback, play an announcement, restore.
//!
//! The same state machine serves a whole group, a single joiner, and an
//! independent player. A [`NotificationPlan`] decides who takes part:
//!
//! - participant 0 receives the announcement URI and every transport RPC
//! - `touch_volume_of` marks whose volume is captured and overridden
//! - `state_source` answers "was the group playing?" (a joiner reports its
//!   own state, which is not the group's)
//! - `leave_group_semantics` skips track/position restore, since rejoining
//!   the group brings the coordinator's position back on its own

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::params::Volume;
use crate::config::Config;
use crate::error::UniversalResult;
use crate::sonos::didl::notification_metadata;
use crate::sonos::playback::{
    get_media_info, get_position_info, get_transport_state, play, seek, select_track,
    set_av_transport_uri,
};
use crate::sonos::soap::SoapResult;
use crate::sonos::traits::SoapTransport;
use crate::sonos::types::{GroupTopology, Member};
use crate::sonos::utils::parse_hhmmss_ms;
use crate::sonos::volume::{get_volume, set_volume};

// ─────────────────────────────────────────────────────────────────────────────
// Plan & Options
// ─────────────────────────────────────────────────────────────────────────────

/// Who takes part in a notification and how they are restored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPlan {
    participants: Vec<Member>,
    touch_volume_of: Vec<bool>,
    leave_group_semantics: bool,
    state_source: Member,
}

impl NotificationPlan {
    /// The whole group, driven through the coordinator.
    ///
    /// Volumes of the other members are only touched with `same_volume`.
    #[must_use]
    pub fn for_group(topology: &GroupTopology, same_volume: bool) -> Self {
        let participants = topology.members().to_vec();
        let touch_volume_of = (0..participants.len())
            .map(|i| i == 0 || same_volume)
            .collect();
        Self {
            participants,
            touch_volume_of,
            leave_group_semantics: false,
            state_source: topology.coordinator().clone(),
        }
    }

    /// The addressed joiner alone. It leaves the group for the
    /// announcement and rejoins on restore.
    #[must_use]
    pub fn for_joiner(topology: &GroupTopology) -> Self {
        Self {
            participants: vec![topology.caller().clone()],
            touch_volume_of: vec![true],
            leave_group_semantics: true,
            state_source: topology.coordinator().clone(),
        }
    }

    /// A single player that is not grouped.
    #[must_use]
    pub fn single(player: &Member) -> Self {
        Self {
            participants: vec![player.clone()],
            touch_volume_of: vec![true],
            leave_group_semantics: false,
            state_source: player.clone(),
        }
    }

    #[must_use]
    pub fn participants(&self) -> &[Member] {
        &self.participants
    }

    fn target(&self) -> &Member {
        &self.participants[0]
    }

    fn volume_targets(&self) -> impl Iterator<Item = (usize, &Member)> {
        self.participants
            .iter()
            .enumerate()
            .filter(|(i, _)| self.touch_volume_of[*i])
    }
}

/// How long the announcement is held before restoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationDuration {
    Fixed(Duration),
    /// Player-reported track duration plus the configured margin.
    Automatic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationOptions {
    pub uri: String,
    /// Generated from the URI when absent.
    pub metadata: Option<String>,
    /// `None` leaves all volumes alone.
    pub volume: Option<Volume>,
    pub only_when_playing: bool,
    pub duration: NotificationDuration,
}

/// What a notification run ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// `only_when_playing` was set and nothing was playing.
    Skipped,
    Completed { waited: Duration, cancelled: bool },
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot
// ─────────────────────────────────────────────────────────────────────────────

/// Playback state captured right before the override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub was_playing: bool,
    pub current_uri: String,
    pub current_uri_metadata: String,
    pub track_index: u32,
    pub track_count: u32,
    pub rel_time: String,
    pub track_duration: String,
    /// Aligned with the plan's participants.
    pub member_volumes: Vec<Option<u8>>,
}

impl PlaybackSnapshot {
    fn should_reselect_track(&self) -> bool {
        self.track_index > 1 && self.track_count > 1
    }

    fn should_seek(&self) -> bool {
        parse_hhmmss_ms(&self.rel_time).is_some_and(|ms| ms > 0)
    }
}

/// Whether a failing restore step aborts the restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Required,
    BestEffort,
}

impl Step {
    fn settle(self, name: &'static str, result: SoapResult<()>) -> SoapResult<()> {
        match (self, result) {
            (_, Ok(())) => Ok(()),
            (Self::Required, Err(e)) => Err(e),
            (Self::BestEffort, Err(e)) => {
                tracing::warn!(step = name, error = %e, "restore step failed, continuing");
                Ok(())
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ─────────────────────────────────────────────────────────────────────────────

/// Runs one notification end to end.
///
/// Failures while capturing, setting the announcement URI, or starting it
/// abort without restoring. Once the announcement is playing, everything
/// ends in a restore: a failed volume override restores and then reports
/// its error, and `cancel` only cuts the wait short.
///
/// # Errors
/// Any device error from capture, override, or a required restore step.
pub async fn play_notification(
    transport: &dyn SoapTransport,
    config: &Config,
    plan: &NotificationPlan,
    options: NotificationOptions,
    cancel: &CancellationToken,
) -> UniversalResult<NotificationOutcome> {
    let target = plan.target();

    let state = get_transport_state(transport, &plan.state_source.base_url).await?;
    let was_playing = state.is_playing();
    if options.only_when_playing && !was_playing {
        tracing::debug!(
            player = %target.display_name,
            state = %state,
            "not playing, notification skipped"
        );
        return Ok(NotificationOutcome::Skipped);
    }

    let mut snapshot = capture(transport, plan, was_playing, options.volume).await?;
    tracing::debug!(
        player = %target.display_name,
        uri = %snapshot.current_uri,
        track = snapshot.track_index,
        rel_time = %snapshot.rel_time,
        "snapshot captured"
    );

    let metadata = options
        .metadata
        .unwrap_or_else(|| notification_metadata(&options.uri));
    set_av_transport_uri(transport, &target.base_url, &options.uri, &metadata).await?;
    play(transport, &target.base_url).await?;
    if let Some(volume) = options.volume {
        if let Err(e) = override_volumes(transport, plan, volume, &mut snapshot).await {
            tracing::warn!(
                player = %target.display_name,
                error = %e,
                "volume override failed, restoring"
            );
            if let Err(restore_err) = restore(transport, plan, snapshot).await {
                tracing::warn!(error = %restore_err, "restore after failed override failed");
            }
            return Err(e.into());
        }
    }

    let hold = match options.duration {
        NotificationDuration::Fixed(d) => d,
        NotificationDuration::Automatic => automatic_duration(transport, config, target).await,
    };
    tracing::info!(
        player = %target.display_name,
        uri = %options.uri,
        hold_ms = hold.as_millis() as u64,
        "notification playing"
    );

    let started = Instant::now();
    let cancelled = tokio::select! {
        _ = tokio::time::sleep(hold) => false,
        _ = cancel.cancelled() => true,
    };
    let waited = started.elapsed();
    if cancelled {
        tracing::info!(player = %target.display_name, "notification cancelled, restoring");
    }

    restore(transport, plan, snapshot).await?;
    Ok(NotificationOutcome::Completed { waited, cancelled })
}

async fn capture(
    transport: &dyn SoapTransport,
    plan: &NotificationPlan,
    was_playing: bool,
    volume: Option<Volume>,
) -> SoapResult<PlaybackSnapshot> {
    let target = plan.target();
    let media = get_media_info(transport, &target.base_url).await?;
    let position = get_position_info(transport, &target.base_url).await?;

    let mut member_volumes = vec![None; plan.participants.len()];
    if volume.is_some() {
        for (i, member) in plan.volume_targets() {
            member_volumes[i] = Some(get_volume(transport, &member.base_url).await?);
        }
    }

    Ok(PlaybackSnapshot {
        was_playing,
        current_uri: media.current_uri,
        current_uri_metadata: media.current_uri_metadata,
        track_index: position.track,
        track_count: media.nr_tracks,
        rel_time: position.rel_time,
        track_duration: position.track_duration,
        member_volumes,
    })
}

/// Applies the announcement volume to every volume target in order.
///
/// On failure the members not yet changed are dropped from the snapshot, so
/// restore only resets volumes that were actually overridden.
async fn override_volumes(
    transport: &dyn SoapTransport,
    plan: &NotificationPlan,
    volume: Volume,
    snapshot: &mut PlaybackSnapshot,
) -> SoapResult<()> {
    for (i, member) in plan.volume_targets() {
        if let Err(e) = set_volume(transport, &member.base_url, volume.get()).await {
            snapshot.member_volumes[i..].fill(None);
            return Err(e);
        }
    }
    Ok(())
}

/// Track duration of the announcement plus margin; the configured default
/// when the player cannot tell (streams report `0:00:00`).
async fn automatic_duration(
    transport: &dyn SoapTransport,
    config: &Config,
    target: &Member,
) -> Duration {
    let fallback = Duration::from_millis(config.default_notification_duration_ms);
    match get_position_info(transport, &target.base_url).await {
        Ok(position) => match parse_hhmmss_ms(&position.track_duration) {
            Some(ms) if ms > 0 => Duration::from_millis(ms + config.automatic_duration_margin_ms),
            _ => {
                tracing::debug!(
                    track_duration = %position.track_duration,
                    "no usable track duration, using default"
                );
                fallback
            }
        },
        Err(e) => {
            tracing::debug!(error = %e, "could not read track duration, using default");
            fallback
        }
    }
}

async fn restore(
    transport: &dyn SoapTransport,
    plan: &NotificationPlan,
    snapshot: PlaybackSnapshot,
) -> SoapResult<()> {
    let target = plan.target();

    for (member, volume) in plan.participants.iter().zip(&snapshot.member_volumes) {
        if let Some(volume) = volume {
            Step::Required.settle(
                "volume",
                set_volume(transport, &member.base_url, *volume).await,
            )?;
        }
    }

    Step::Required.settle(
        "uri",
        set_av_transport_uri(
            transport,
            &target.base_url,
            &snapshot.current_uri,
            &snapshot.current_uri_metadata,
        )
        .await,
    )?;

    if !plan.leave_group_semantics {
        if snapshot.should_reselect_track() {
            Step::BestEffort.settle(
                "track",
                select_track(transport, &target.base_url, snapshot.track_index).await,
            )?;
        }
        if snapshot.should_seek() {
            Step::BestEffort.settle(
                "seek",
                seek(transport, &target.base_url, &snapshot.rel_time).await,
            )?;
        }
    }

    if snapshot.was_playing {
        Step::Required.settle("play", play(transport, &target.base_url).await)?;
    }

    tracing::debug!(player = %target.display_name, "playback restored");
    Ok(())
}
