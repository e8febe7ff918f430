pub mod token_api;
pub mod showcase;

pub use token_api::{
    RankedToken, TokenApi, DEFAULT_LIMIT, DEFAULT_MAX_RISK, DEFAULT_MIN_MARKET_CAP,
    DEFAULT_MIN_VOLUME, DEFAULT_TOKENS_PER_STEP,
};
pub use showcase::run_showcase;
