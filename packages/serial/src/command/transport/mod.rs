use zwnet_core::submodule;

submodule!(application_command);
submodule!(send_data);
