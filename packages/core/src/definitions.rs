use crate::submodule;

submodule!(command_classes);
submodule!(command_type);
submodule!(device_class);
submodule!(endpoint_index);
submodule!(function_type);
submodule!(message_origin);
submodule!(node_id);
submodule!(node_info);
submodule!(node_status);
submodule!(zwave_library_type);
