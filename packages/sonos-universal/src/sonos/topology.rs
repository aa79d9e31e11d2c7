//! Resolves the group a player belongs to from fresh ZoneGroupState.

use super::traits::SoapTransport;
use super::types::{GroupTopology, Member, PlayerAddress, ZoneGroup, ZoneGroupMember};
use super::zone_groups::get_zone_groups;
use crate::error::{UniversalError, UniversalResult};

/// Finds the group and the matching member.
///
/// With a non-empty `player_name` the first member whose zone name equals it
/// wins; otherwise the first member whose host equals the anchor's host.
fn find_member<'a>(
    groups: &'a [ZoneGroup],
    anchor_host: &str,
    player_name: &str,
) -> Option<(&'a ZoneGroup, &'a ZoneGroupMember)> {
    groups.iter().find_map(|group| {
        group
            .members
            .iter()
            .find(|m| {
                if player_name.is_empty() {
                    m.host == anchor_host
                } else {
                    m.zone_name == player_name
                }
            })
            .map(|m| (group, m))
    })
}

/// Builds a topology from parsed groups.
///
/// # Errors
/// `TopologyNotFound` when `groups` is empty or the matched group's
/// coordinator is missing from its member list; `PlayerNotInAnyGroup` when no
/// member matches.
pub fn topology_from_groups(
    groups: &[ZoneGroup],
    anchor_host: &str,
    player_name: &str,
) -> UniversalResult<GroupTopology> {
    if groups.is_empty() {
        return Err(UniversalError::TopologyNotFound);
    }

    let (group, found) = find_member(groups, anchor_host, player_name).ok_or_else(|| {
        let wanted = if player_name.is_empty() {
            anchor_host
        } else {
            player_name
        };
        UniversalError::PlayerNotInAnyGroup(wanted.to_string())
    })?;

    let coordinator = group
        .members
        .iter()
        .find(|m| m.uuid == group.coordinator_uuid)
        .ok_or(UniversalError::TopologyNotFound)?;

    let others: Vec<Member> = group
        .members
        .iter()
        .filter(|m| m.uuid != coordinator.uuid)
        .map(Member::from)
        .collect();

    let caller_index = if found.uuid == coordinator.uuid {
        0
    } else {
        others
            .iter()
            .position(|m| m.hostname == found.host)
            .map_or(0, |i| i + 1)
    };

    GroupTopology::new(Member::from(coordinator), others, caller_index)
        .ok_or(UniversalError::TopologyNotFound)
}

/// Queries `anchor` for ZoneGroupState and resolves the group of the
/// addressed player.
pub async fn resolve(
    transport: &dyn SoapTransport,
    anchor: &PlayerAddress,
    player_name: &str,
) -> UniversalResult<GroupTopology> {
    let groups = get_zone_groups(transport, &anchor.base_url()).await?;
    let topology = topology_from_groups(&groups, &anchor.host, player_name)?;

    log::debug!(
        "[Topology] {} resolved to {} member(s), coordinator {}, caller index {}",
        if player_name.is_empty() {
            anchor.host.as_str()
        } else {
            player_name
        },
        topology.member_count(),
        topology.coordinator().uuid,
        topology.caller_index()
    );

    Ok(topology)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sonos::test_fixtures::{self, MockTransport};
    use crate::sonos::types::Role;

    fn zgm(uuid: &str, host: &str, name: &str) -> ZoneGroupMember {
        ZoneGroupMember {
            uuid: uuid.into(),
            host: host.into(),
            port: 1400,
            zone_name: name.into(),
        }
    }

    fn household() -> Vec<ZoneGroup> {
        vec![
            ZoneGroup {
                id: "G1".into(),
                coordinator_uuid: "RINCON_B".into(),
                members: vec![
                    zgm("RINCON_A", "192.168.1.10", "Kitchen"),
                    zgm("RINCON_B", "192.168.1.11", "Living"),
                    zgm("RINCON_C", "192.168.1.12", "Office"),
                ],
            },
            ZoneGroup {
                id: "G2".into(),
                coordinator_uuid: "RINCON_D".into(),
                members: vec![zgm("RINCON_D", "192.168.1.13", "Bath")],
            },
        ]
    }

    #[test]
    fn coordinator_is_always_first() {
        let t = topology_from_groups(&household(), "192.168.1.10", "").unwrap();
        let uuids: Vec<_> = t.members().iter().map(|m| m.uuid.as_str()).collect();
        assert_eq!(uuids, ["RINCON_B", "RINCON_A", "RINCON_C"]);
        assert_eq!(t.caller_index(), 1);
        assert_eq!(t.role(), Role::Joiner);
    }

    #[test]
    fn search_by_name_overrides_anchor() {
        let t = topology_from_groups(&household(), "192.168.1.10", "Living").unwrap();
        assert_eq!(t.caller_index(), 0);
        assert_eq!(t.role(), Role::Coordinator);

        let t = topology_from_groups(&household(), "192.168.1.10", "Bath").unwrap();
        assert_eq!(t.role(), Role::Independent);
        assert_eq!(t.coordinator().base_url, "http://192.168.1.13:1400");
    }

    #[test]
    fn unknown_player_is_not_in_any_group() {
        let err = topology_from_groups(&household(), "192.168.1.10", "Garage").unwrap_err();
        assert!(matches!(err, UniversalError::PlayerNotInAnyGroup(ref n) if n == "Garage"));

        let err = topology_from_groups(&household(), "10.0.0.1", "").unwrap_err();
        assert!(matches!(err, UniversalError::PlayerNotInAnyGroup(_)));
    }

    #[test]
    fn no_groups_is_topology_not_found() {
        let err = topology_from_groups(&[], "192.168.1.10", "").unwrap_err();
        assert!(matches!(err, UniversalError::TopologyNotFound));
    }

    #[tokio::test]
    async fn resolve_queries_anchor() {
        let mock = MockTransport::new();
        mock.respond(
            "GetZoneGroupState",
            test_fixtures::zone_group_state(&[(
                "RINCON_A",
                &[("RINCON_A", "192.168.1.10", "Kitchen"), ("RINCON_B", "192.168.1.11", "Office")],
            )]),
        );

        let anchor = PlayerAddress::new("192.168.1.11", 1400);
        let t = resolve(&mock, &anchor, "").await.unwrap();
        assert_eq!(t.role(), Role::Joiner);
        assert_eq!(t.caller().display_name, "Office");
        assert_eq!(mock.calls()[0].base_url, "http://192.168.1.11:1400");
    }

    #[tokio::test]
    async fn resolve_with_empty_state_is_topology_not_found() {
        let mock = MockTransport::new();
        mock.respond("GetZoneGroupState", test_fixtures::zone_group_state(&[]));

        let anchor = PlayerAddress::new("192.168.1.11", 1400);
        let err = resolve(&mock, &anchor, "").await.unwrap_err();
        assert!(matches!(err, UniversalError::TopologyNotFound));
    }
}
