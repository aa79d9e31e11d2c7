//! Group command execution.
//!
//! Every command follows the same path: validate, resolve the group fresh
//! from the addressed player, check the group is free, run the RPCs, and
//! return a result patch for the host (empty means "nothing changed").

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use super::dispatch::{Command, CommandRequest, ExportRequest, NotificationRequest, Verb};
use super::group_lock::GroupLocks;
use super::notification::{
    play_notification, NotificationOptions, NotificationOutcome, NotificationPlan,
};
use super::params::{ValidatedGroupParameters, Volume};
use crate::config::Config;
use crate::error::{UniversalError, UniversalResult};
use crate::sonos::favorites::{find_by_title, get_all_mysonos_items, ProcessingType};
use crate::sonos::playback::{
    get_transport_state, next, pause, play, play_http_radio, play_tunein, previous,
    set_av_transport_uri, stop,
};
use crate::sonos::queue::{add_uri_to_queue, play_queue, queue_size};
use crate::sonos::soap::HttpSoapTransport;
use crate::sonos::topology::resolve;
use crate::sonos::traits::SoapTransport;
use crate::sonos::types::{GroupTopology, PlayerAddress};
use crate::sonos::volume::{get_volume, set_volume};

/// Fields the host merges into its message. Empty means unchanged.
pub type ResultPatch = Map<String, Value>;

fn payload(value: impl Into<Value>) -> ResultPatch {
    let mut patch = ResultPatch::new();
    patch.insert("payload".to_string(), value.into());
    patch
}

/// Runs group commands against any player of the household.
pub struct GroupController {
    transport: Arc<dyn SoapTransport>,
    config: Config,
    locks: GroupLocks,
    shutdown: CancellationToken,
}

impl GroupController {
    pub fn new(transport: Arc<dyn SoapTransport>, config: Config) -> Self {
        Self {
            transport,
            config,
            locks: GroupLocks::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Controller talking HTTP with the configured timeouts.
    ///
    /// # Errors
    /// `Validation` for an unusable config, `Transport` if the HTTP client
    /// cannot be built.
    pub fn with_http(config: Config) -> UniversalResult<Self> {
        config.validate()?;
        let transport =
            HttpSoapTransport::new(&config).map_err(|e| UniversalError::Transport {
                action: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self::new(Arc::new(transport), config))
    }

    /// Cancelling this token cuts running notification waits short. Their
    /// restore still runs.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    #[must_use]
    pub fn locks(&self) -> &GroupLocks {
        &self.locks
    }

    /// Executes one command with `anchor` as the addressed player.
    ///
    /// # Errors
    /// Validation, topology, lock, and device errors, in that order of
    /// detection.
    pub async fn execute(
        &self,
        anchor: &PlayerAddress,
        request: &CommandRequest,
    ) -> UniversalResult<ResultPatch> {
        let command: Command = request.command.parse()?;
        let params = ValidatedGroupParameters::from_message(&request.message)?;
        let verb = Verb::parse(command, &request.message)?;

        let topology = resolve(self.transport.as_ref(), anchor, &params.player_name).await?;
        if verb.guards_independent() && !params.same_volume && topology.is_independent() {
            return Err(UniversalError::validation(
                "sameVolume is invalid: player is independent",
            ));
        }

        let coordinator_uuid = topology.coordinator().uuid.clone();
        let claimed: Vec<&str> = if command.is_notification() {
            topology.members().iter().map(|m| m.uuid.as_str()).collect()
        } else {
            vec![coordinator_uuid.as_str(), topology.caller().uuid.as_str()]
        };
        let _guard = self.locks.try_acquire(claimed)?;

        log::info!(
            "[Group] {} on {} ({} member(s), caller {})",
            command,
            coordinator_uuid,
            topology.member_count(),
            topology.caller().display_name
        );

        let group = GroupCommand {
            transport: self.transport.as_ref(),
            topology: &topology,
            params: &params,
        };
        match verb {
            Verb::Play => group.play().await,
            Verb::Stop => group.stop().await,
            Verb::NextTrack => group.next_track().await,
            Verb::PreviousTrack => group.previous_track().await,
            Verb::TogglePlayback => group.toggle_playback().await,
            Verb::PlayerGetVolume => group.player_get_volume().await,
            Verb::PlayerSetVolume(volume) => group.player_set_volume(volume).await,
            Verb::GetPlaybackState => group.playback_state().await,
            Verb::PlayerGetRole => Ok(payload(topology.role().as_str())),
            Verb::PlayQueue => group.play_queue().await,
            Verb::PlayTuneIn(station) => group.play_tunein(&station).await,
            Verb::PlayExport(export) => group.play_export(&export).await,
            Verb::PlayHttpRadio(url) => group.play_http_radio(&url).await,
            Verb::GetMySonos => group.get_mysonos().await,
            Verb::PlayMySonos(search) => group.play_mysonos(&search).await,
            Verb::PlayNotification(request) => {
                let plan = if topology.is_independent() {
                    NotificationPlan::single(topology.coordinator())
                } else {
                    NotificationPlan::for_group(&topology, params.same_volume)
                };
                self.notify(&plan, request, params.volume).await
            }
            Verb::JoinerPlayNotification(request) => {
                if topology.caller_index() == 0 {
                    return Err(UniversalError::validation("player is not a joiner"));
                }
                let plan = NotificationPlan::for_joiner(&topology);
                self.notify(&plan, request, params.volume).await
            }
        }
    }

    async fn notify(
        &self,
        plan: &NotificationPlan,
        request: NotificationRequest,
        volume: Option<Volume>,
    ) -> UniversalResult<ResultPatch> {
        let options = NotificationOptions {
            uri: request.uri,
            metadata: None,
            volume,
            only_when_playing: request.only_when_playing,
            duration: request.duration,
        };
        let outcome = play_notification(
            self.transport.as_ref(),
            &self.config,
            plan,
            options,
            &self.shutdown,
        )
        .await?;
        if let NotificationOutcome::Completed { waited, cancelled } = outcome {
            log::debug!(
                "[Group] notification done after {} ms{}",
                waited.as_millis(),
                if cancelled { " (cancelled)" } else { "" }
            );
        }
        Ok(ResultPatch::new())
    }
}

/// One command's view of its resolved group.
struct GroupCommand<'a> {
    transport: &'a dyn SoapTransport,
    topology: &'a GroupTopology,
    params: &'a ValidatedGroupParameters,
}

impl GroupCommand<'_> {
    fn coordinator_url(&self) -> &str {
        &self.topology.coordinator().base_url
    }

    fn caller_url(&self) -> &str {
        &self.topology.caller().base_url
    }

    /// Applies the requested volume to every member, or only to the caller
    /// without `sameVolume`.
    async fn apply_volume(&self) -> UniversalResult<()> {
        let Some(volume) = self.params.volume else {
            return Ok(());
        };
        if self.params.same_volume {
            for member in self.topology.members() {
                set_volume(self.transport, &member.base_url, volume.get()).await?;
            }
        } else {
            set_volume(self.transport, self.caller_url(), volume.get()).await?;
        }
        Ok(())
    }

    async fn stop(&self) -> UniversalResult<ResultPatch> {
        stop(self.transport, self.coordinator_url()).await?;
        Ok(ResultPatch::new())
    }

    async fn next_track(&self) -> UniversalResult<ResultPatch> {
        next(self.transport, self.coordinator_url()).await?;
        Ok(ResultPatch::new())
    }

    async fn previous_track(&self) -> UniversalResult<ResultPatch> {
        previous(self.transport, self.coordinator_url()).await?;
        Ok(ResultPatch::new())
    }

    async fn play(&self) -> UniversalResult<ResultPatch> {
        play(self.transport, self.coordinator_url()).await?;
        self.apply_volume().await?;
        Ok(ResultPatch::new())
    }

    async fn toggle_playback(&self) -> UniversalResult<ResultPatch> {
        let state = get_transport_state(self.transport, self.coordinator_url()).await?;
        if state.is_playing() {
            pause(self.transport, self.coordinator_url()).await?;
        } else {
            play(self.transport, self.coordinator_url()).await?;
        }
        Ok(ResultPatch::new())
    }

    async fn playback_state(&self) -> UniversalResult<ResultPatch> {
        let state = get_transport_state(self.transport, self.coordinator_url()).await?;
        Ok(payload(state.as_str()))
    }

    async fn player_get_volume(&self) -> UniversalResult<ResultPatch> {
        let volume = get_volume(self.transport, self.caller_url()).await?;
        Ok(payload(volume))
    }

    async fn player_set_volume(&self, volume: Volume) -> UniversalResult<ResultPatch> {
        set_volume(self.transport, self.caller_url(), volume.get()).await?;
        Ok(ResultPatch::new())
    }

    async fn play_queue(&self) -> UniversalResult<ResultPatch> {
        let coordinator = self.topology.coordinator();
        if queue_size(self.transport, &coordinator.base_url).await? == 0 {
            return Err(UniversalError::validation("queue is empty"));
        }
        play_queue(self.transport, &coordinator.base_url, &coordinator.uuid).await?;
        self.apply_volume().await?;
        Ok(ResultPatch::new())
    }

    async fn play_tunein(&self, station: &str) -> UniversalResult<ResultPatch> {
        play_tunein(self.transport, self.coordinator_url(), station).await?;
        self.apply_volume().await?;
        Ok(ResultPatch::new())
    }

    async fn play_export(&self, export: &ExportRequest) -> UniversalResult<ResultPatch> {
        let coordinator = self.topology.coordinator();
        if export.queue {
            add_uri_to_queue(
                self.transport,
                &coordinator.base_url,
                &export.uri,
                &export.metadata,
            )
            .await?;
            play_queue(self.transport, &coordinator.base_url, &coordinator.uuid).await?;
        } else {
            set_av_transport_uri(
                self.transport,
                &coordinator.base_url,
                &export.uri,
                &export.metadata,
            )
            .await?;
            play(self.transport, &coordinator.base_url).await?;
        }
        self.apply_volume().await?;
        Ok(ResultPatch::new())
    }

    async fn play_http_radio(&self, url: &str) -> UniversalResult<ResultPatch> {
        play_http_radio(self.transport, self.coordinator_url(), url).await?;
        self.apply_volume().await?;
        Ok(ResultPatch::new())
    }

    async fn get_mysonos(&self) -> UniversalResult<ResultPatch> {
        let items = get_all_mysonos_items(self.transport, self.coordinator_url()).await?;
        let listed =
            serde_json::to_value(&items).map_err(|e| UniversalError::UnexpectedResponse {
                action: "Browse".into(),
                detail: e.to_string(),
            })?;
        Ok(payload(listed))
    }

    /// Plays the first favorite whose title contains `search`; the payload
    /// is its full title.
    async fn play_mysonos(&self, search: &str) -> UniversalResult<ResultPatch> {
        let coordinator = self.topology.coordinator();
        let items = get_all_mysonos_items(self.transport, &coordinator.base_url).await?;
        let item = find_by_title(&items, search).ok_or_else(|| {
            UniversalError::validation(format!("topic not found in My Sonos: {search}"))
        })?;

        match item.processing_type {
            ProcessingType::Queue => {
                add_uri_to_queue(
                    self.transport,
                    &coordinator.base_url,
                    &item.uri,
                    &item.metadata,
                )
                .await?;
                play_queue(self.transport, &coordinator.base_url, &coordinator.uuid).await?;
            }
            ProcessingType::Stream => {
                set_av_transport_uri(
                    self.transport,
                    &coordinator.base_url,
                    &item.uri,
                    &item.metadata,
                )
                .await?;
                play(self.transport, &coordinator.base_url).await?;
            }
            ProcessingType::Unsupported => {
                return Err(UniversalError::validation(format!(
                    "My Sonos item is not supported: {} ({})",
                    item.title, item.upnp_class
                )));
            }
        }
        log::info!("[Group] playing My Sonos item {}", item.title);

        self.apply_volume().await?;
        Ok(payload(item.title.clone()))
    }
}
