mod backend_parity;
mod cli_contracts;
mod composition_duality;
mod size_properties;
mod star_wars;
mod support;
