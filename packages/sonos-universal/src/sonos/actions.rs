//! Immutable catalog of templated UPnP actions.
//!
//! Each entry names the service, the action verb, default arguments, and where
//! in the parsed response body the result lives. Set actions additionally
//! declare the literal they expect there (the response element's namespace).
//! Per-call arguments are produced by [`build_args`]; entries are never mutated.

use super::services::SonosService;

/// A catalog entry describing one UPnP action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTemplate {
    /// Catalog key, e.g. `SelectTrack`.
    pub name: &'static str,
    pub service: SonosService,
    /// UPnP action verb sent on the wire, e.g. `Seek`.
    pub action: &'static str,
    /// Default arguments in wire order.
    pub default_args: &'static [(&'static str, &'static str)],
    /// Keys leading to the result in the parsed body.
    pub response_path: &'static [&'static str],
    /// Expected literal at `response_path` for set actions.
    pub response_value: Option<&'static str>,
}

impl ActionTemplate {
    /// Control endpoint for this action's service.
    #[must_use]
    pub fn http_path(&self) -> &'static str {
        self.service.control_path()
    }

    /// True for actions validated against `response_value`.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.response_value.is_some()
    }
}

const AV_URN: &str = "urn:schemas-upnp-org:service:AVTransport:1";
const RC_URN: &str = "urn:schemas-upnp-org:service:RenderingControl:1";

const INSTANCE: (&str, &str) = ("InstanceID", "0");

/// Every action the crate sends.
pub static CATALOG: &[ActionTemplate] = &[
    // ── AVTransport: set ────────────────────────────────────────────────────
    ActionTemplate {
        name: "Play",
        service: SonosService::AVTransport,
        action: "Play",
        default_args: &[INSTANCE, ("Speed", "1")],
        response_path: &["s:Envelope", "s:Body", "u:PlayResponse", "xmlns:u"],
        response_value: Some(AV_URN),
    },
    ActionTemplate {
        name: "Pause",
        service: SonosService::AVTransport,
        action: "Pause",
        default_args: &[INSTANCE],
        response_path: &["s:Envelope", "s:Body", "u:PauseResponse", "xmlns:u"],
        response_value: Some(AV_URN),
    },
    ActionTemplate {
        name: "Stop",
        service: SonosService::AVTransport,
        action: "Stop",
        default_args: &[INSTANCE],
        response_path: &["s:Envelope", "s:Body", "u:StopResponse", "xmlns:u"],
        response_value: Some(AV_URN),
    },
    ActionTemplate {
        name: "Next",
        service: SonosService::AVTransport,
        action: "Next",
        default_args: &[INSTANCE],
        response_path: &["s:Envelope", "s:Body", "u:NextResponse", "xmlns:u"],
        response_value: Some(AV_URN),
    },
    ActionTemplate {
        name: "Previous",
        service: SonosService::AVTransport,
        action: "Previous",
        default_args: &[INSTANCE],
        response_path: &["s:Envelope", "s:Body", "u:PreviousResponse", "xmlns:u"],
        response_value: Some(AV_URN),
    },
    ActionTemplate {
        name: "SetAVTransportURI",
        service: SonosService::AVTransport,
        action: "SetAVTransportURI",
        default_args: &[INSTANCE, ("CurrentURI", ""), ("CurrentURIMetaData", "")],
        response_path: &["s:Envelope", "s:Body", "u:SetAVTransportURIResponse", "xmlns:u"],
        response_value: Some(AV_URN),
    },
    ActionTemplate {
        name: "SeekRelTime",
        service: SonosService::AVTransport,
        action: "Seek",
        default_args: &[INSTANCE, ("Unit", "REL_TIME"), ("Target", "00:00:00")],
        response_path: &["s:Envelope", "s:Body", "u:SeekResponse", "xmlns:u"],
        response_value: Some(AV_URN),
    },
    ActionTemplate {
        name: "SelectTrack",
        service: SonosService::AVTransport,
        action: "Seek",
        default_args: &[INSTANCE, ("Unit", "TRACK_NR"), ("Target", "1")],
        response_path: &["s:Envelope", "s:Body", "u:SeekResponse", "xmlns:u"],
        response_value: Some(AV_URN),
    },
    ActionTemplate {
        name: "AddURIToQueue",
        service: SonosService::AVTransport,
        action: "AddURIToQueue",
        default_args: &[
            INSTANCE,
            ("EnqueuedURI", ""),
            ("EnqueuedURIMetaData", ""),
            ("DesiredFirstTrackNumberEnqueued", "0"),
            ("EnqueueAsNext", "1"),
        ],
        response_path: &["s:Envelope", "s:Body", "u:AddURIToQueueResponse", "xmlns:u"],
        response_value: Some(AV_URN),
    },
    // ── AVTransport: get ────────────────────────────────────────────────────
    ActionTemplate {
        name: "GetTransportInfo",
        service: SonosService::AVTransport,
        action: "GetTransportInfo",
        default_args: &[INSTANCE],
        response_path: &[
            "s:Envelope",
            "s:Body",
            "u:GetTransportInfoResponse",
            "CurrentTransportState",
        ],
        response_value: None,
    },
    ActionTemplate {
        name: "GetMediaInfo",
        service: SonosService::AVTransport,
        action: "GetMediaInfo",
        default_args: &[INSTANCE],
        response_path: &["s:Envelope", "s:Body", "u:GetMediaInfoResponse"],
        response_value: None,
    },
    ActionTemplate {
        name: "GetPositionInfo",
        service: SonosService::AVTransport,
        action: "GetPositionInfo",
        default_args: &[INSTANCE],
        response_path: &["s:Envelope", "s:Body", "u:GetPositionInfoResponse"],
        response_value: None,
    },
    // ── RenderingControl ────────────────────────────────────────────────────
    ActionTemplate {
        name: "SetVolume",
        service: SonosService::RenderingControl,
        action: "SetVolume",
        default_args: &[INSTANCE, ("Channel", "Master"), ("DesiredVolume", "5")],
        response_path: &["s:Envelope", "s:Body", "u:SetVolumeResponse", "xmlns:u"],
        response_value: Some(RC_URN),
    },
    ActionTemplate {
        name: "GetVolume",
        service: SonosService::RenderingControl,
        action: "GetVolume",
        default_args: &[INSTANCE, ("Channel", "Master")],
        response_path: &["s:Envelope", "s:Body", "u:GetVolumeResponse", "CurrentVolume"],
        response_value: None,
    },
    // ── ContentDirectory ────────────────────────────────────────────────────
    ActionTemplate {
        name: "Browse",
        service: SonosService::ContentDirectory,
        action: "Browse",
        default_args: &[
            ("ObjectID", "FV:2"),
            ("BrowseFlag", "BrowseDirectChildren"),
            ("Filter", "*"),
            ("StartingIndex", "0"),
            ("RequestedCount", "100"),
            ("SortCriteria", ""),
        ],
        response_path: &["s:Envelope", "s:Body", "u:BrowseResponse"],
        response_value: None,
    },
    // ── ZoneGroupTopology ───────────────────────────────────────────────────
    ActionTemplate {
        name: "GetZoneGroupState",
        service: SonosService::ZoneGroupTopology,
        action: "GetZoneGroupState",
        default_args: &[],
        response_path: &["s:Envelope", "s:Body", "u:GetZoneGroupStateResponse", "ZoneGroupState"],
        response_value: None,
    },
];

/// Looks up a catalog entry by name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static ActionTemplate> {
    CATALOG.iter().find(|t| t.name == name)
}

/// Builds the argument list for one call.
///
/// Defaults keep their wire order with matching overrides substituted in
/// place. Overrides for names the template does not declare are appended.
#[must_use]
pub fn build_args(template: &ActionTemplate, overrides: &[(&str, String)]) -> Vec<(String, String)> {
    let mut args: Vec<(String, String)> = template
        .default_args
        .iter()
        .map(|(name, default)| {
            let value = overrides
                .iter()
                .find(|(k, _)| k == name)
                .map_or_else(|| (*default).to_string(), |(_, v)| v.clone());
            ((*name).to_string(), value)
        })
        .collect();

    for (name, value) in overrides {
        if !template.default_args.iter().any(|(k, _)| k == name) {
            args.push(((*name).to_string(), value.clone()));
        }
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            assert!(
                CATALOG[i + 1..].iter().all(|b| b.name != a.name),
                "duplicate catalog entry {}",
                a.name
            );
        }
    }

    #[test]
    fn set_actions_expect_their_service_urn() {
        for template in CATALOG.iter().filter(|t| t.is_set()) {
            assert_eq!(template.response_value, Some(template.service.urn()));
            assert_eq!(template.response_path.last(), Some(&"xmlns:u"));
            assert_eq!(
                template.response_path[2],
                format!("u:{}Response", template.action)
            );
        }
    }

    #[test]
    fn build_args_substitutes_in_place() {
        let template = lookup("SetVolume").unwrap();
        let args = build_args(template, &[("DesiredVolume", "30".to_string())]);
        assert_eq!(
            args,
            vec![
                ("InstanceID".to_string(), "0".to_string()),
                ("Channel".to_string(), "Master".to_string()),
                ("DesiredVolume".to_string(), "30".to_string()),
            ]
        );
    }

    #[test]
    fn build_args_does_not_leak_between_calls() {
        let template = lookup("SetAVTransportURI").unwrap();
        let first = build_args(template, &[("CurrentURI", "x-file:a".to_string())]);
        let second = build_args(template, &[]);
        assert_eq!(first[1].1, "x-file:a");
        assert_eq!(second[1].1, "");
        assert_eq!(template.default_args[1], ("CurrentURI", ""));
    }

    #[test]
    fn build_args_appends_undeclared_overrides() {
        let template = lookup("Stop").unwrap();
        let args = build_args(template, &[("Extra", "1".to_string())]);
        assert_eq!(args.last(), Some(&("Extra".to_string(), "1".to_string())));
    }

    #[test]
    fn lookup_unknown_is_none() {
        assert!(lookup("SelfDestruct").is_none());
        assert_eq!(lookup("SelectTrack").map(|t| t.action), Some("Seek"));
    }
}
