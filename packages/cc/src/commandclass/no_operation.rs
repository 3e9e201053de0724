use crate::prelude::*;
use zwnet_core::prelude::*;

// No Operation CC has no subcommands

#[derive(Default, Debug, Clone, PartialEq)]
pub struct NoOperationCC {}

impl CCBase for NoOperationCC {}

impl CCId for NoOperationCC {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::NoOperation
    }

    fn cc_command(&self) -> Option<u8> {
        None
    }
}
