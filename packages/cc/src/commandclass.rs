use enum_dispatch::enum_dispatch;
use zwnet_core::prelude::*;
use zwnet_core::submodule;

submodule!(association);
submodule!(association_group_info);
submodule!(multi_channel_association);
submodule!(no_operation);
submodule!(security);
submodule!(version);
submodule!(wake_up);

#[enum_dispatch(CC)]
/// Identifies a command class and its commands
pub trait CCId: CCBase {
    /// The command class identifier
    fn cc_id(&self) -> CommandClasses;

    /// The subcommand identifier, if applicable
    fn cc_command(&self) -> Option<u8>;
}

#[enum_dispatch(CC)]
/// Command-specific functionality that may need to be implemented for each command
pub trait CCBase: std::fmt::Debug + Sync + Send + Clone + PartialEq {
    /// Whether this CC expects a response
    fn expects_response(&self) -> bool {
        // Unless specified otherwise, assume that the CC doesn't
        false
    }

    /// If this CC expects a response, this function can be used to test whether
    /// the response is the expected one.
    fn test_response(&self, response: &CC) -> bool {
        let _ = response;
        // Unless specified otherwise, assume that the response is no match
        false
    }
}

#[enum_dispatch]
#[derive(Debug, Clone, PartialEq)]
pub enum CC {
    NoOperationCC(NoOperationCC),
    AssociationCCSet(AssociationCCSet),
    AssociationCCGet(AssociationCCGet),
    AssociationCCReport(AssociationCCReport),
    AssociationCCRemove(AssociationCCRemove),
    AssociationCCSupportedGroupingsGet(AssociationCCSupportedGroupingsGet),
    AssociationCCSupportedGroupingsReport(AssociationCCSupportedGroupingsReport),
    MultiChannelAssociationCCSet(MultiChannelAssociationCCSet),
    MultiChannelAssociationCCGet(MultiChannelAssociationCCGet),
    MultiChannelAssociationCCReport(MultiChannelAssociationCCReport),
    MultiChannelAssociationCCRemove(MultiChannelAssociationCCRemove),
    MultiChannelAssociationCCSupportedGroupingsGet(MultiChannelAssociationCCSupportedGroupingsGet),
    MultiChannelAssociationCCSupportedGroupingsReport(
        MultiChannelAssociationCCSupportedGroupingsReport,
    ),
    AssociationGroupInfoCCNameGet(AssociationGroupInfoCCNameGet),
    AssociationGroupInfoCCNameReport(AssociationGroupInfoCCNameReport),
    AssociationGroupInfoCCInfoGet(AssociationGroupInfoCCInfoGet),
    AssociationGroupInfoCCInfoReport(AssociationGroupInfoCCInfoReport),
    AssociationGroupInfoCCCommandListGet(AssociationGroupInfoCCCommandListGet),
    AssociationGroupInfoCCCommandListReport(AssociationGroupInfoCCCommandListReport),
    SecurityCCSchemeGet(SecurityCCSchemeGet),
    SecurityCCSchemeReport(SecurityCCSchemeReport),
    SecurityCCSchemeInherit(SecurityCCSchemeInherit),
    SecurityCCNonceGet(SecurityCCNonceGet),
    SecurityCCNonceReport(SecurityCCNonceReport),
    SecurityCCNetworkKeySet(SecurityCCNetworkKeySet),
    SecurityCCNetworkKeyVerify(SecurityCCNetworkKeyVerify),
    VersionCCCommandClassGet(VersionCCCommandClassGet),
    VersionCCCommandClassReport(VersionCCCommandClassReport),
    WakeUpCCIntervalGet(WakeUpCCIntervalGet),
    WakeUpCCIntervalReport(WakeUpCCIntervalReport),
    WakeUpCCIntervalSet(WakeUpCCIntervalSet),
}

/// The sender and receiver(s) of a CC
#[derive(Debug, Clone, PartialEq)]
pub struct CCAddress {
    /// The source node of this CC
    pub source_node_id: NodeId,
    /// The destination node(s) of this CC
    pub destination: Destination,
    /// Which endpoint of the node this CC belongs to
    pub endpoint_index: EndpointIndex,
}

impl Default for CCAddress {
    fn default() -> Self {
        // The default for the CC address is not terribly useful,
        // but it makes working with it less cumbersome
        Self {
            source_node_id: NodeId::unspecified(),
            destination: Destination::Singlecast(NodeId::unspecified()),
            endpoint_index: EndpointIndex::Root,
        }
    }
}

/// Defines the destination of a command class
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    Singlecast(NodeId),
    Broadcast,
}

impl From<NodeId> for Destination {
    fn from(val: NodeId) -> Self {
        Self::Singlecast(val)
    }
}

impl From<u8> for Destination {
    fn from(val: u8) -> Self {
        Self::Singlecast(val.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithAddress<T> {
    address: CCAddress,
    command: T,
}

impl<T> WithAddress<T> {
    pub fn address(&self) -> &CCAddress {
        &self.address
    }

    pub fn with_destination(self, destination: Destination) -> Self {
        let mut address = self.address;
        address.destination = destination;

        Self { address, ..self }
    }

    pub fn with_source_node_id(self, source_node_id: NodeId) -> Self {
        let mut address = self.address;
        address.source_node_id = source_node_id;

        Self { address, ..self }
    }

    pub fn into_inner(self) -> T {
        self.command
    }
}

impl<T> std::ops::Deref for WithAddress<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.command
    }
}

pub trait CCAddressable {
    fn with_address(self, address: CCAddress) -> WithAddress<Self>
    where
        Self: Sized,
    {
        WithAddress {
            address,
            command: self,
        }
    }

    fn with_destination(self, destination: Destination) -> WithAddress<Self>
    where
        Self: Sized,
    {
        self.with_address(CCAddress {
            destination,
            ..Default::default()
        })
    }
}

impl<T> CCAddressable for T where T: Into<CC> {}
