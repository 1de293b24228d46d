pub mod bank;
pub mod bollinger;
pub mod rsi;
pub mod sma;
pub mod student_t;
pub mod window;

pub use bank::{IndicatorBank, IndicatorConfig, IndicatorSnapshot};
pub use bollinger::{BandPosition, BollingerBands};
pub use window::RollingWindow;
