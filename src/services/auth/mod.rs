pub mod password;
pub mod token_codec;
