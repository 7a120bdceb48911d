pub mod candle;
pub mod chunk;
pub mod request_params;
pub mod timeframe;
