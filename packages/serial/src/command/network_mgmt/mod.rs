use zwnet_core::submodule;

submodule!(add_node_to_network);
submodule!(assign_return_route);
submodule!(assign_suc_return_route);
submodule!(delete_return_route);
submodule!(get_node_protocol_info);
submodule!(get_routing_info);
submodule!(get_suc_node_id);
submodule!(remove_failed_node);
submodule!(remove_node_from_network);
submodule!(replace_failed_node);
submodule!(request_node_neighbor_update);
submodule!(set_suc_node_id);
