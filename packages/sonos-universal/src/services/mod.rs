//! Group command services.
//!
//! This module contains the command layer that sits between a host and the
//! device layer (`sonos/`): parameter validation, dispatch, per-group
//! locking, and the notification overlay.

pub mod dispatch;
pub mod group_commands;
pub mod group_lock;
pub mod notification;
pub mod params;

pub use dispatch::{Command, CommandRequest};
pub use group_commands::{GroupController, ResultPatch};
pub use group_lock::GroupLocks;
pub use notification::{
    play_notification, NotificationDuration, NotificationOptions, NotificationOutcome,
    NotificationPlan, PlaybackSnapshot,
};
pub use params::{CommandMessage, ExportItem, ValidatedGroupParameters, Volume};
