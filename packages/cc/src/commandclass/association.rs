use crate::prelude::*;
use derive_try_from_primitive::TryFromPrimitive;
use std::fmt::Display;
use typed_builder::TypedBuilder;
use zwnet_core::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum AssociationCCCommand {
    Set = 0x01,
    Get = 0x02,
    Report = 0x03,
    Remove = 0x04,
    SupportedGroupingsGet = 0x05,
    SupportedGroupingsReport = 0x06,
}

/// A single association destination: a node, optionally narrowed down to one
/// of its multi-channel endpoints. `endpoint == None` means a plain
/// (node-level) association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AssociationAddress {
    pub node_id: NodeId,
    pub endpoint: Option<u8>,
}

impl AssociationAddress {
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            endpoint: None,
        }
    }

    pub fn with_endpoint(node_id: NodeId, endpoint: u8) -> Self {
        Self {
            node_id,
            endpoint: Some(endpoint),
        }
    }
}

impl Display for AssociationAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.endpoint {
            Some(endpoint) => write!(f, "{}:{}", self.node_id, endpoint),
            None => write!(f, "{}", self.node_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct AssociationCCSet {
    pub group_id: u8,
    pub node_ids: Vec<NodeId>,
}

impl CCBase for AssociationCCSet {}

impl CCId for AssociationCCSet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Association
    }

    fn cc_command(&self) -> Option<u8> {
        Some(AssociationCCCommand::Set as _)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationCCGet {
    pub group_id: u8,
}

impl CCBase for AssociationCCGet {
    fn expects_response(&self) -> bool {
        true
    }

    fn test_response(&self, response: &CC) -> bool {
        matches!(response, CC::AssociationCCReport(report) if report.group_id == self.group_id)
    }
}

impl CCId for AssociationCCGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Association
    }

    fn cc_command(&self) -> Option<u8> {
        Some(AssociationCCCommand::Get as _)
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct AssociationCCReport {
    pub group_id: u8,
    pub max_nodes: u8,
    #[builder(default)]
    pub reports_to_follow: u8,
    #[builder(default)]
    pub node_ids: Vec<NodeId>,
}

impl CCBase for AssociationCCReport {}

impl CCId for AssociationCCReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Association
    }

    fn cc_command(&self) -> Option<u8> {
        Some(AssociationCCCommand::Report as _)
    }
}

/// Removes the given nodes from a group. An empty node list clears the
/// entire group, a `None` group clears the given nodes from all groups.
#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct AssociationCCRemove {
    #[builder(default, setter(into))]
    pub group_id: Option<u8>,
    #[builder(default)]
    pub node_ids: Vec<NodeId>,
}

impl CCBase for AssociationCCRemove {}

impl CCId for AssociationCCRemove {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Association
    }

    fn cc_command(&self) -> Option<u8> {
        Some(AssociationCCCommand::Remove as _)
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct AssociationCCSupportedGroupingsGet {}

impl CCBase for AssociationCCSupportedGroupingsGet {
    fn expects_response(&self) -> bool {
        true
    }

    fn test_response(&self, response: &CC) -> bool {
        matches!(response, CC::AssociationCCSupportedGroupingsReport(_))
    }
}

impl CCId for AssociationCCSupportedGroupingsGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Association
    }

    fn cc_command(&self) -> Option<u8> {
        Some(AssociationCCCommand::SupportedGroupingsGet as _)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationCCSupportedGroupingsReport {
    pub groups_count: u8,
}

impl CCBase for AssociationCCSupportedGroupingsReport {}

impl CCId for AssociationCCSupportedGroupingsReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Association
    }

    fn cc_command(&self) -> Option<u8> {
        Some(AssociationCCCommand::SupportedGroupingsReport as _)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_matches_only_the_report_for_its_group() {
        let get = AssociationCCGet { group_id: 2 };
        assert!(get.expects_response());

        let matching: CC = AssociationCCReport::builder()
            .group_id(2)
            .max_nodes(5)
            .build()
            .into();
        assert!(get.test_response(&matching));

        let other_group: CC = AssociationCCReport::builder()
            .group_id(3)
            .max_nodes(5)
            .build()
            .into();
        assert!(!get.test_response(&other_group));

        let unrelated: CC = AssociationCCSupportedGroupingsReport { groups_count: 3 }.into();
        assert!(!get.test_response(&unrelated));
    }

    #[test]
    fn test_association_address_display() {
        let plain = AssociationAddress::new(NodeId::new(5));
        assert_eq!(plain.to_string(), "005");
        let endpoint = AssociationAddress::with_endpoint(NodeId::new(5), 2);
        assert_eq!(endpoint.to_string(), "005:2");
    }
}
