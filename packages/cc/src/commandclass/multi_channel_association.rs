use crate::prelude::*;
use derive_try_from_primitive::TryFromPrimitive;
use typed_builder::TypedBuilder;
use zwnet_core::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum MultiChannelAssociationCCCommand {
    Set = 0x01,
    Get = 0x02,
    Report = 0x03,
    Remove = 0x04,
    SupportedGroupingsGet = 0x05,
    SupportedGroupingsReport = 0x06,
}

/// A `(node, endpoint)` destination as carried in Multi Channel Association
/// commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EndpointDestination {
    pub node_id: NodeId,
    pub endpoint: u8,
}

impl EndpointDestination {
    pub fn new(node_id: NodeId, endpoint: u8) -> Self {
        Self { node_id, endpoint }
    }
}

impl From<EndpointDestination> for AssociationAddress {
    fn from(dest: EndpointDestination) -> Self {
        AssociationAddress::with_endpoint(dest.node_id, dest.endpoint)
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct MultiChannelAssociationCCSet {
    pub group_id: u8,
    #[builder(default)]
    pub node_ids: Vec<NodeId>,
    #[builder(default)]
    pub endpoints: Vec<EndpointDestination>,
}

impl CCBase for MultiChannelAssociationCCSet {}

impl CCId for MultiChannelAssociationCCSet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::MultiChannelAssociation
    }

    fn cc_command(&self) -> Option<u8> {
        Some(MultiChannelAssociationCCCommand::Set as _)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiChannelAssociationCCGet {
    pub group_id: u8,
}

impl CCBase for MultiChannelAssociationCCGet {
    fn expects_response(&self) -> bool {
        true
    }

    fn test_response(&self, response: &CC) -> bool {
        matches!(
            response,
            CC::MultiChannelAssociationCCReport(report) if report.group_id == self.group_id
        )
    }
}

impl CCId for MultiChannelAssociationCCGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::MultiChannelAssociation
    }

    fn cc_command(&self) -> Option<u8> {
        Some(MultiChannelAssociationCCCommand::Get as _)
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct MultiChannelAssociationCCReport {
    pub group_id: u8,
    pub max_nodes: u8,
    #[builder(default)]
    pub reports_to_follow: u8,
    #[builder(default)]
    pub node_ids: Vec<NodeId>,
    #[builder(default)]
    pub endpoints: Vec<EndpointDestination>,
}

impl CCBase for MultiChannelAssociationCCReport {}

impl CCId for MultiChannelAssociationCCReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::MultiChannelAssociation
    }

    fn cc_command(&self) -> Option<u8> {
        Some(MultiChannelAssociationCCCommand::Report as _)
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct MultiChannelAssociationCCRemove {
    #[builder(default, setter(into))]
    pub group_id: Option<u8>,
    #[builder(default)]
    pub node_ids: Vec<NodeId>,
    #[builder(default)]
    pub endpoints: Vec<EndpointDestination>,
}

impl CCBase for MultiChannelAssociationCCRemove {}

impl CCId for MultiChannelAssociationCCRemove {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::MultiChannelAssociation
    }

    fn cc_command(&self) -> Option<u8> {
        Some(MultiChannelAssociationCCCommand::Remove as _)
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct MultiChannelAssociationCCSupportedGroupingsGet {}

impl CCBase for MultiChannelAssociationCCSupportedGroupingsGet {
    fn expects_response(&self) -> bool {
        true
    }

    fn test_response(&self, response: &CC) -> bool {
        matches!(
            response,
            CC::MultiChannelAssociationCCSupportedGroupingsReport(_)
        )
    }
}

impl CCId for MultiChannelAssociationCCSupportedGroupingsGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::MultiChannelAssociation
    }

    fn cc_command(&self) -> Option<u8> {
        Some(MultiChannelAssociationCCCommand::SupportedGroupingsGet as _)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiChannelAssociationCCSupportedGroupingsReport {
    pub groups_count: u8,
}

impl CCBase for MultiChannelAssociationCCSupportedGroupingsReport {}

impl CCId for MultiChannelAssociationCCSupportedGroupingsReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::MultiChannelAssociation
    }

    fn cc_command(&self) -> Option<u8> {
        Some(MultiChannelAssociationCCCommand::SupportedGroupingsReport as _)
    }
}
