use zwnet_core::submodule;

submodule!(hard_reset);
