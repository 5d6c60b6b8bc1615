mod fuzz_security;
mod policy_serde;
