//! Zone group topology parsing and retrieval.
//!
//! Handles parsing ZoneGroupState XML into structured `ZoneGroup` data
//! and fetching it from a Sonos speaker via the action catalog.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::executor::execute_get;
use super::soap::SoapResult;
use super::traits::SoapTransport;
use super::types::{ZoneGroup, ZoneGroupMember};
use super::utils::{get_xml_attr, host_port_from_location};

/// Parses ZoneGroupState XML into groups, keeping device member order.
///
/// Expects the inner ZoneGroupState document with entities already decoded.
///
/// # Filtering
/// - Zone Bridges (BOOST devices with `IsZoneBridge="1"`) are skipped as they
///   cannot play audio.
/// - Members without UUID, Location, or ZoneName are skipped.
/// - Satellites nested inside a member are not group members.
/// - Groups left without members are excluded.
pub fn parse_zone_group_xml(xml: &str) -> Vec<ZoneGroup> {
    let mut groups = Vec::new();
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut current: Option<ZoneGroup> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"ZoneGroup" => {
                    current = Some(ZoneGroup {
                        id: get_xml_attr(e, b"ID").unwrap_or_default(),
                        coordinator_uuid: get_xml_attr(e, b"Coordinator").unwrap_or_default(),
                        members: Vec::new(),
                    });
                }
                b"ZoneGroupMember" => {
                    let Some(group) = current.as_mut() else {
                        continue;
                    };
                    if get_xml_attr(e, b"IsZoneBridge").as_deref() == Some("1") {
                        continue;
                    }

                    let Some(uuid) = get_xml_attr(e, b"UUID") else {
                        continue;
                    };
                    let Some((host, port)) =
                        get_xml_attr(e, b"Location").and_then(|l| host_port_from_location(&l))
                    else {
                        continue;
                    };
                    let Some(zone_name) = get_xml_attr(e, b"ZoneName") else {
                        continue;
                    };

                    group.members.push(ZoneGroupMember {
                        uuid,
                        host,
                        port,
                        zone_name,
                    });
                }
                _ => {}
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"ZoneGroup" => {
                if let Some(group) = current.take() {
                    if !group.members.is_empty() {
                        groups.push(group);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("[Sonos] XML parse error in zone groups: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    groups
}

/// Fetches the current zone groups from a Sonos speaker.
///
/// # Arguments
/// * `transport` - SOAP transport
/// * `base_url` - Any speaker on the household, e.g. `http://192.168.1.30:1400`
pub async fn get_zone_groups(
    transport: &dyn SoapTransport,
    base_url: &str,
) -> SoapResult<Vec<ZoneGroup>> {
    let state = execute_get(transport, base_url, "GetZoneGroupState", &[]).await?;
    Ok(parse_zone_group_xml(&state))
}
