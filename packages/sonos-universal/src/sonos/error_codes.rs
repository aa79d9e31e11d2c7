//! UPnP fault code descriptions.
//!
//! Tables are keyed by upper-cased context name (service or action). Lookups
//! fall back to the generic UPnP table and finally to `"unknown error"`.

use crate::protocol_constants::UNKNOWN_UPNP_ERROR;

type CodeTable = &'static [(&'static str, &'static str)];

/// Codes defined by the UPnP Device Architecture for every service.
const UPNP: CodeTable = &[
    ("400", "Bad Request"),
    ("401", "Invalid Action"),
    ("402", "Invalid Args"),
    ("404", "Invalid Var"),
    ("412", "Precondition Failed"),
    ("501", "Action Failed"),
    ("600", "Argument Value Invalid"),
    ("601", "Argument Value Out of Range"),
    ("602", "Optional Action Not Implemented"),
    ("603", "Out Of Memory"),
    ("604", "Human Intervention Required"),
    ("605", "String Argument Too Long"),
    ("606", "Action Not Authorized"),
    ("607", "Signature Failure"),
    ("608", "Signature Missing"),
    ("609", "Not Encrypted"),
    ("610", "Invalid Sequence"),
    ("611", "Invalid Control URL"),
    ("612", "No Such Session"),
];

const AVTRANSPORT: CodeTable = &[
    ("701", "Transition not available"),
    ("702", "No contents"),
    ("703", "Read error"),
    ("704", "Format not supported for playback"),
    ("705", "Transport is locked"),
    ("706", "Write error"),
    ("707", "Media is protected or not writeable"),
    ("708", "Format not supported for recording"),
    ("709", "Media is full"),
    ("710", "Seek mode not supported"),
    ("711", "Illegal seek target"),
    ("712", "Play mode not supported"),
    ("713", "Record quality not supported"),
    ("714", "Illegal MIME-Type"),
    ("715", "Content BUSY"),
    ("716", "Resource not found"),
    ("717", "Play speed not supported"),
    ("718", "Invalid InstanceID"),
];

const RENDERINGCONTROL: CodeTable = &[("701", "Invalid Name"), ("702", "Invalid InstanceID")];

const CONTENTDIRECTORY: CodeTable = &[
    ("701", "No such object"),
    ("702", "Invalid CurrentTagValue"),
    ("703", "Invalid NewTagValue"),
    ("704", "Required tag"),
    ("705", "Read only tag"),
    ("706", "Parameter Mismatch"),
    ("708", "Unsupported or invalid search criteria"),
    ("709", "Unsupported or invalid sort criteria"),
    ("710", "No such container"),
    ("711", "Restricted object"),
    ("712", "Bad metadata"),
    ("713", "Restricted parent object"),
    ("714", "No such source resource"),
    ("715", "Resource access denied"),
    ("716", "Transfer busy"),
    ("717", "No such file transfer"),
    ("718", "No such destination resource"),
    ("719", "Destination resource access denied"),
    ("720", "Cannot process the request"),
];

const ZONEGROUPTOPOLOGY: CodeTable = &[
    ("701", "Update already in progress"),
    ("702", "Update failed"),
];

/// Returns the table for an upper-cased context name.
fn table_for(context_upper: &str) -> Option<CodeTable> {
    match context_upper {
        "UPNP" => Some(UPNP),
        "AVTRANSPORT" => Some(AVTRANSPORT),
        "RENDERINGCONTROL" => Some(RENDERINGCONTROL),
        "CONTENTDIRECTORY" => Some(CONTENTDIRECTORY),
        "ZONEGROUPTOPOLOGY" => Some(ZONEGROUPTOPOLOGY),
        _ => None,
    }
}

fn find(table: CodeTable, code: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, message)| *message)
}

/// Resolves a UPnP error code to a human-readable message.
///
/// `contexts` are tried in order (e.g. action name, then service name), each
/// upper-cased; the generic UPnP table is consulted last. An empty code or an
/// unknown one yields `"unknown error"`.
#[must_use]
pub fn upnp_error_message(code: &str, contexts: &[&str]) -> &'static str {
    let code = code.trim();
    if code.is_empty() {
        return UNKNOWN_UPNP_ERROR;
    }

    contexts
        .iter()
        .filter_map(|ctx| table_for(&ctx.to_uppercase()))
        .chain(std::iter::once(UPNP))
        .find_map(|table| find(table, code))
        .unwrap_or(UNKNOWN_UPNP_ERROR)
}
