pub mod cancellation;
pub mod cipher_context;
pub mod cipher_traits;
pub mod cipher_types;
pub mod deal;
pub mod deal_key_expansion;
pub mod des;
pub mod des_key_expansion;
pub mod des_round_function;
pub mod des_tables;
pub mod errors;
pub mod feistel_network;
pub mod padding;
pub mod permutations;
pub mod triple_des;
