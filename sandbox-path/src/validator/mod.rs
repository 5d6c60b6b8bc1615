pub mod path_history;
pub mod sandbox;
pub mod trusted_root;
